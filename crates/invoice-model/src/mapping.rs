//! Header-to-field mapping data.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stored value marking a header the user deliberately left unmapped.
pub const SKIP_SENTINEL: &str = "__skip__";

/// What a header is mapped to.
///
/// Serialized as the bare field id, or [`SKIP_SENTINEL`] for a skip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MappingTarget {
    Field(String),
    Skip,
}

impl MappingTarget {
    pub fn field(id: impl Into<String>) -> Self {
        Self::Field(id.into())
    }

    pub fn field_id(&self) -> Option<&str> {
        match self {
            Self::Field(id) => Some(id),
            Self::Skip => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }
}

impl From<String> for MappingTarget {
    fn from(value: String) -> Self {
        if value == SKIP_SENTINEL {
            Self::Skip
        } else {
            Self::Field(value)
        }
    }
}

impl From<MappingTarget> for String {
    fn from(target: MappingTarget) -> Self {
        match target {
            MappingTarget::Field(id) => id,
            MappingTarget::Skip => SKIP_SENTINEL.to_string(),
        }
    }
}

impl fmt::Display for MappingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(id) => f.write_str(id),
            Self::Skip => f.write_str("(skipped)"),
        }
    }
}

/// Header name -> mapping target.
///
/// An absent key means the header was never mapped (or was cleared). The type
/// does not forbid two headers pointing at the same field; conflict handling
/// lives in the mapping store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMapping {
    entries: BTreeMap<String, MappingTarget>,
}

impl HeaderMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, header: &str) -> Option<&MappingTarget> {
        self.entries.get(header)
    }

    /// Field id for a header, ignoring skips.
    pub fn field_for(&self, header: &str) -> Option<&str> {
        self.entries.get(header).and_then(MappingTarget::field_id)
    }

    /// Insert or overwrite, returning the previous target.
    pub fn insert(&mut self, header: impl Into<String>, target: MappingTarget) -> Option<MappingTarget> {
        self.entries.insert(header.into(), target)
    }

    pub fn remove(&mut self, header: &str) -> Option<MappingTarget> {
        self.entries.remove(header)
    }

    pub fn contains_header(&self, header: &str) -> bool {
        self.entries.contains_key(header)
    }

    /// Present and not skipped.
    pub fn is_mapped(&self, header: &str) -> bool {
        self.field_for(header).is_some()
    }

    pub fn is_skipped(&self, header: &str) -> bool {
        self.entries.get(header).is_some_and(MappingTarget::is_skip)
    }

    /// Distinct non-skip field ids used as values.
    pub fn field_ids(&self) -> BTreeSet<&str> {
        self.entries
            .values()
            .filter_map(MappingTarget::field_id)
            .collect()
    }

    /// First header (in key order) mapped to `field_id`, optionally ignoring one header.
    pub fn header_for_field(&self, field_id: &str, except: Option<&str>) -> Option<&str> {
        self.entries
            .iter()
            .filter(|(header, _)| Some(header.as_str()) != except)
            .find(|(_, target)| target.field_id() == Some(field_id))
            .map(|(header, _)| header.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingTarget)> {
        self.entries.iter().map(|(h, t)| (h.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<H: Into<String>> FromIterator<(H, MappingTarget)> for HeaderMapping {
    fn from_iter<I: IntoIterator<Item = (H, MappingTarget)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(h, t)| (h.into(), t)).collect(),
        }
    }
}
