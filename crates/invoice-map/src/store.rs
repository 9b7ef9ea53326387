//! User-editable header mapping.

use invoice_model::{HeaderMapping, MappingTarget};
use tracing::debug;

use crate::error::MappingError;

/// Mutable mapping from header to field id or skip.
///
/// [`set`](Self::set) overwrites unconditionally, leaving it to the selection
/// surface to keep two headers off the same field. [`try_set`](Self::try_set)
/// and [`reassign`](Self::reassign) are the conflict-aware alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingStore {
    mapping: HeaderMapping,
}

impl MappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from a previously saved mapping.
    pub fn from_mapping(mapping: HeaderMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &HeaderMapping {
        &self.mapping
    }

    pub fn into_mapping(self) -> HeaderMapping {
        self.mapping
    }

    pub fn get(&self, header: &str) -> Option<&MappingTarget> {
        self.mapping.get(header)
    }

    /// Map `header` to `field_id`, returning the previous target.
    pub fn set(&mut self, header: &str, field_id: &str) -> Option<MappingTarget> {
        debug!(header, field = field_id, "set mapping");
        self.mapping
            .insert(header, MappingTarget::field(field_id))
    }

    /// Like [`set`](Self::set) but refuses a field another header already holds.
    pub fn try_set(
        &mut self,
        header: &str,
        field_id: &str,
    ) -> Result<Option<MappingTarget>, MappingError> {
        if let Some(holder) = self.claimed_by(field_id, Some(header)) {
            return Err(MappingError::FieldAlreadyClaimed {
                field: field_id.to_string(),
                header: holder.to_string(),
            });
        }
        Ok(self.set(header, field_id))
    }

    /// Map `header` to `field_id`, clearing any other header that held it.
    ///
    /// Returns the headers that lost the field.
    pub fn reassign(&mut self, header: &str, field_id: &str) -> Vec<String> {
        let previous: Vec<String> = self
            .mapping
            .iter()
            .filter(|(h, target)| *h != header && target.field_id() == Some(field_id))
            .map(|(h, _)| h.to_string())
            .collect();
        for other in &previous {
            debug!(header = %other, field = field_id, "field reassigned away");
            self.mapping.remove(other);
        }
        self.set(header, field_id);
        previous
    }

    /// Mark `header` as intentionally unmapped.
    pub fn skip(&mut self, header: &str) -> Option<MappingTarget> {
        debug!(header, "skip header");
        self.mapping.insert(header, MappingTarget::Skip)
    }

    /// Forget any decision for `header`.
    pub fn remove(&mut self, header: &str) -> Option<MappingTarget> {
        debug!(header, "clear mapping");
        self.mapping.remove(header)
    }

    /// Header holding `field_id`, ignoring `except`.
    pub fn claimed_by(&self, field_id: &str, except: Option<&str>) -> Option<&str> {
        self.mapping.header_for_field(field_id, except)
    }

    pub fn is_claimed(&self, field_id: &str) -> bool {
        self.claimed_by(field_id, None).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_without_conflict_check() {
        let mut store = MappingStore::new();
        store.set("Invoice No", "invoice_number");
        store.set("Number", "invoice_number");

        assert_eq!(
            store.get("Number"),
            Some(&MappingTarget::field("invoice_number"))
        );
        assert_eq!(
            store.get("Invoice No"),
            Some(&MappingTarget::field("invoice_number"))
        );
    }

    #[test]
    fn try_set_reports_holder() {
        let mut store = MappingStore::new();
        store.set("Invoice No", "invoice_number");

        let err = store.try_set("Number", "invoice_number").unwrap_err();
        assert_eq!(
            err,
            MappingError::FieldAlreadyClaimed {
                field: "invoice_number".into(),
                header: "Invoice No".into(),
            }
        );
        assert!(store.get("Number").is_none());

        // Re-setting the same header to its own field is fine.
        assert!(store.try_set("Invoice No", "invoice_number").is_ok());
    }

    #[test]
    fn reassign_clears_previous_holder() {
        let mut store = MappingStore::new();
        store.set("Invoice No", "invoice_number");

        let cleared = store.reassign("Number", "invoice_number");
        assert_eq!(cleared, vec!["Invoice No".to_string()]);
        assert!(store.get("Invoice No").is_none());
        assert_eq!(store.claimed_by("invoice_number", None), Some("Number"));
    }

    #[test]
    fn skip_and_remove() {
        let mut store = MappingStore::new();
        store.set("Comment", "note");
        store.skip("Comment");
        assert_eq!(store.get("Comment"), Some(&MappingTarget::Skip));
        assert!(!store.is_claimed("note"));

        assert_eq!(store.remove("Comment"), Some(MappingTarget::Skip));
        assert!(store.get("Comment").is_none());
    }
}
