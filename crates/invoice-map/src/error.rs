//! Error types for mapping and persistence operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from mapping operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MappingError {
    /// Field id is not part of the catalog.
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// Header is not one of the session's spreadsheet headers.
    #[error("Header not found: {0}")]
    HeaderNotFound(String),

    /// Field already mapped from another header.
    #[error("Field '{field}' already mapped from header '{header}'")]
    FieldAlreadyClaimed {
        /// The field that was already used.
        field: String,
        /// The header currently holding it.
        header: String,
    },

    /// No suggestion is available for the header.
    #[error("No suggestion available for header '{0}'")]
    NoSuggestion(String),

    /// Required fields still lack a header.
    #[error("Required fields are not mapped: {}", .0.join(", "))]
    RequiredFieldsUnmapped(Vec<String>),
}

impl MappingError {
    /// Get the header associated with this error, if any.
    pub fn header(&self) -> Option<&str> {
        match self {
            Self::HeaderNotFound(h) | Self::NoSuggestion(h) => Some(h),
            Self::FieldAlreadyClaimed { header, .. } => Some(header),
            _ => None,
        }
    }

    /// Get the field id associated with this error, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::FieldNotFound(f) => Some(f),
            Self::FieldAlreadyClaimed { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Errors from loading or saving mappings.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Failed to serialize mapping '{key}'")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored data could not be parsed.
    #[error("Failed to parse stored mapping '{key}'")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backing store refused the write.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl PersistenceError {
    /// Text suitable for a non-blocking notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {operation} the file at {}", path.display()),
            Self::Serialization { .. } => {
                "An error occurred while saving the column mapping.".to_string()
            }
            Self::Deserialization { .. } => {
                "The saved column mapping could not be read and was ignored.".to_string()
            }
            Self::Unavailable(reason) => {
                format!("The column mapping could not be saved ({reason}). Your changes are kept.")
            }
        }
    }
}

/// Failure of an explicit save.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The mapping is not complete enough to be finalized.
    #[error(transparent)]
    Incomplete(#[from] MappingError),

    /// Writing to storage failed; the in-memory mapping is retained.
    #[error(transparent)]
    Storage(#[from] PersistenceError),
}
