//! Mapping progress accounting.

use invoice_model::{FieldCatalog, HeaderMapping};
use serde::Serialize;

/// Counts derived from the header list, the mapping and the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    /// Number of headers.
    pub total: usize,
    /// Headers mapped to a field that exists in the catalog.
    pub mapped: usize,
    /// `total - mapped`; skipped and orphaned headers count here.
    pub unmapped: usize,
    /// Distinct required fields that some header maps to.
    pub required_mapped: usize,
    /// Required fields in the catalog.
    pub required_total: usize,
    /// `round(100 * required_mapped / required_total)`, or 0 with no required fields.
    pub progress_percent: u32,
}

impl ProgressSnapshot {
    /// True once every required field has a header.
    pub fn is_complete(&self) -> bool {
        self.required_mapped == self.required_total
    }
}

/// Compute progress for `headers` under `mapping`.
///
/// A field id missing from the catalog counts as unmapped.
pub fn progress(
    headers: &[String],
    mapping: &HeaderMapping,
    catalog: &FieldCatalog,
) -> ProgressSnapshot {
    let total = headers.len();
    let mapped = headers
        .iter()
        .filter(|h| mapping.field_for(h).is_some_and(|id| catalog.contains(id)))
        .count();

    let required_total = catalog.required_count();
    // field_ids is already distinct, so two headers on one field count once.
    let required_mapped = mapping
        .field_ids()
        .into_iter()
        .filter(|id| catalog.is_required(id))
        .count();

    let progress_percent = if required_total == 0 {
        0
    } else {
        (100.0 * required_mapped as f64 / required_total as f64).round() as u32
    };

    ProgressSnapshot {
        total,
        mapped,
        unmapped: total - mapped,
        required_mapped,
        required_total,
        progress_percent,
    }
}
