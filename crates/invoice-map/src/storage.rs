//! Persistence of header mappings.
//!
//! Mappings are stored under a string key, one key per upload flow (see
//! [`storage_key`]). Two backends are provided:
//!
//! - [`MappingRepository`]: one JSON file per key in a directory, written
//!   atomically (temp file + rename).
//! - [`MemoryStorage`]: in-process map, for tests and dry runs.
//!
//! Loading is forgiving: [`load_or_default`] turns unreadable data into an
//! empty mapping and logs a warning.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use invoice_model::{HeaderMapping, InvoiceDirection};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PersistenceError;

/// Current stored format version.
pub const FORMAT_VERSION: u32 = 1;

/// Key-value store for header mappings.
pub trait MappingStorage {
    /// Load the mapping stored under `key`, `Ok(None)` when there is none.
    fn load(&self, key: &str) -> Result<Option<HeaderMapping>, PersistenceError>;

    /// Store `mapping` under `key`, replacing any previous value.
    fn save(&self, key: &str, mapping: &HeaderMapping) -> Result<(), PersistenceError>;
}

/// Storage key for the mapping of one invoice direction.
pub fn storage_key(direction: InvoiceDirection) -> String {
    format!("invoice-mapping-{direction}")
}

/// Load a mapping, treating missing or corrupt data as empty.
pub fn load_or_default(storage: &dyn MappingStorage, key: &str) -> HeaderMapping {
    match storage.load(key) {
        Ok(Some(mapping)) => {
            info!(key, entries = mapping.len(), "loaded saved mapping");
            mapping
        }
        Ok(None) => HeaderMapping::new(),
        Err(error) => {
            warn!(key, %error, "ignoring unreadable saved mapping");
            HeaderMapping::new()
        }
    }
}

/// Stored mapping with repository metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMapping {
    #[serde(default = "default_version")]
    pub version: u32,
    pub saved_at: Option<DateTime<Utc>>,
    pub mapping: HeaderMapping,
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

impl StoredMapping {
    pub fn new(mapping: HeaderMapping) -> Self {
        Self {
            version: FORMAT_VERSION,
            saved_at: Some(Utc::now()),
            mapping,
        }
    }
}

/// Directory-backed mapping store.
#[derive(Debug, Clone)]
pub struct MappingRepository {
    base_dir: PathBuf,
}

impl MappingRepository {
    /// Open a repository at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).map_err(|source| PersistenceError::Io {
            operation: "create directory",
            path: base_dir.clone(),
            source,
        })?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", normalize_key(key)))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }

    /// Load with metadata.
    pub fn load_stored(&self, key: &str) -> Result<Option<StoredMapping>, PersistenceError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path).map_err(|source| PersistenceError::Io {
            operation: "read",
            path: path.clone(),
            source,
        })?;
        let stored = serde_json::from_str(&contents).map_err(|source| {
            PersistenceError::Deserialization {
                key: key.to_string(),
                source,
            }
        })?;
        Ok(Some(stored))
    }

    /// Delete the mapping for `key`. Returns whether a file was removed.
    pub fn delete(&self, key: &str) -> Result<bool, PersistenceError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|source| PersistenceError::Io {
            operation: "delete",
            path,
            source,
        })?;
        Ok(true)
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
        let temp_path = path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).map_err(|source| PersistenceError::Io {
            operation: "create",
            path: temp_path.clone(),
            source,
        })?;
        file.write_all(bytes).map_err(|source| PersistenceError::Io {
            operation: "write",
            path: temp_path.clone(),
            source,
        })?;
        file.sync_all().map_err(|source| PersistenceError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, path).map_err(|source| PersistenceError::Io {
            operation: "rename",
            path: path.to_path_buf(),
            source,
        })
    }
}

impl MappingStorage for MappingRepository {
    fn load(&self, key: &str) -> Result<Option<HeaderMapping>, PersistenceError> {
        Ok(self.load_stored(key)?.map(|stored| stored.mapping))
    }

    fn save(&self, key: &str, mapping: &HeaderMapping) -> Result<(), PersistenceError> {
        let stored = StoredMapping::new(mapping.clone());
        let json =
            serde_json::to_vec_pretty(&stored).map_err(|source| PersistenceError::Serialization {
                key: key.to_string(),
                source,
            })?;
        let path = self.path_for(key);
        self.write_atomic(&path, &json)?;
        info!(key, path = %path.display(), entries = mapping.len(), "saved mapping");
        Ok(())
    }
}

/// Normalize a key for use in filenames.
fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// In-memory mapping store holding serialized JSON per key.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text under `key`, bypassing serialization.
    pub fn insert_raw(&self, key: impl Into<String>, raw: impl Into<String>) {
        self.entries.borrow_mut().insert(key.into(), raw.into());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl MappingStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<HeaderMapping>, PersistenceError> {
        let entries = self.entries.borrow();
        let Some(raw) = entries.get(key) else {
            return Ok(None);
        };
        serde_json::from_str(raw)
            .map(Some)
            .map_err(|source| PersistenceError::Deserialization {
                key: key.to_string(),
                source,
            })
    }

    fn save(&self, key: &str, mapping: &HeaderMapping) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(mapping).map_err(|source| {
            PersistenceError::Serialization {
                key: key.to_string(),
                source,
            }
        })?;
        self.entries.borrow_mut().insert(key.to_string(), raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoice_model::MappingTarget;

    #[test]
    fn storage_keys_per_direction() {
        assert_eq!(storage_key(InvoiceDirection::Sent), "invoice-mapping-sent");
        assert_eq!(
            storage_key(InvoiceDirection::Received),
            "invoice-mapping-received"
        );
    }

    #[test]
    fn normalize_key_replaces_path_characters() {
        assert_eq!(normalize_key(" ../Invoice Mapping "), "___invoice_mapping");
    }

    #[test]
    fn memory_round_trip() {
        let storage = MemoryStorage::new();
        let mut mapping = HeaderMapping::new();
        mapping.insert("Invoice No", MappingTarget::field("invoice_number"));

        storage.save("k", &mapping).unwrap();
        assert_eq!(storage.load("k").unwrap(), Some(mapping));
        assert_eq!(storage.load("missing").unwrap(), None);
    }

    #[test]
    fn corrupt_data_loads_as_empty() {
        let storage = MemoryStorage::new();
        storage.insert_raw("k", "{not json");

        assert!(storage.load("k").is_err());
        assert!(load_or_default(&storage, "k").is_empty());
    }
}
