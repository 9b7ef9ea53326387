//! Filtering and ordering of the header list for display.
//!
//! All functions return a new list and leave their inputs untouched. Sorts
//! are stable, so equal keys keep their input order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use deunicode::deunicode;
use invoice_model::{FieldCatalog, HeaderMapping};
use serde::{Deserialize, Serialize};

/// Which headers to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Show every header.
    #[default]
    All,
    /// Headers mapped to a catalog field. Skipped headers and ids missing
    /// from the catalog are excluded, matching the progress count.
    Mapped,
    /// Everything [`FilterMode::Mapped`] leaves out.
    Unmapped,
    /// Headers mapped to a required catalog field.
    Required,
}

/// How to order headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Spreadsheet column order.
    #[default]
    Original,
    /// Accent- and case-insensitive, then unaccented and lower-case first
    /// on ties.
    Alphabetical,
    MappedFirst,
    UnmappedFirst,
}

/// Search term plus filter and sort modes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderQuery {
    pub search: String,
    pub filter: FilterMode,
    pub sort: SortMode,
}

/// Apply `mode`, then keep headers containing `search` (case-insensitive).
pub fn filter_headers(
    headers: &[String],
    search: &str,
    mapping: &HeaderMapping,
    mode: FilterMode,
    catalog: &FieldCatalog,
) -> Vec<String> {
    let needle = search.to_lowercase();
    headers
        .iter()
        .filter(|header| matches_mode(header, mapping, mode, catalog))
        .filter(|header| needle.is_empty() || header.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

fn matches_mode(
    header: &str,
    mapping: &HeaderMapping,
    mode: FilterMode,
    catalog: &FieldCatalog,
) -> bool {
    match mode {
        FilterMode::All => true,
        FilterMode::Mapped => maps_known_field(header, mapping, catalog),
        FilterMode::Unmapped => !maps_known_field(header, mapping, catalog),
        FilterMode::Required => mapping
            .field_for(header)
            .is_some_and(|id| catalog.is_required(id)),
    }
}

/// Whether `header` is mapped to a field `catalog` still has.
fn maps_known_field(header: &str, mapping: &HeaderMapping, catalog: &FieldCatalog) -> bool {
    mapping
        .field_for(header)
        .is_some_and(|id| catalog.contains(id))
}

/// Order `headers` by `mode`.
///
/// [`SortMode::Original`] restores each header's position in `original`;
/// headers missing from `original` go last in their input order. The
/// mapped/unmapped modes split headers the way [`FilterMode::Mapped`] does.
pub fn sort_headers(
    headers: &[String],
    mapping: &HeaderMapping,
    mode: SortMode,
    original: &[String],
    catalog: &FieldCatalog,
) -> Vec<String> {
    let mut sorted = headers.to_vec();
    match mode {
        SortMode::Alphabetical => sorted.sort_by(|a, b| alphabetical(a, b)),
        SortMode::MappedFirst => {
            sorted.sort_by_key(|h| !maps_known_field(h, mapping, catalog));
        }
        SortMode::UnmappedFirst => {
            sorted.sort_by_key(|h| maps_known_field(h, mapping, catalog));
        }
        SortMode::Original => {
            let mut positions: BTreeMap<&str, usize> = BTreeMap::new();
            for (idx, header) in original.iter().enumerate() {
                positions.entry(header.as_str()).or_insert(idx);
            }
            sorted.sort_by_key(|h| positions.get(h.as_str()).copied().unwrap_or(usize::MAX));
        }
    }
    sorted
}

/// Filter then sort, as displayed.
pub fn view(
    headers: &[String],
    query: &HeaderQuery,
    mapping: &HeaderMapping,
    catalog: &FieldCatalog,
    original: &[String],
) -> Vec<String> {
    let filtered = filter_headers(headers, &query.search, mapping, query.filter, catalog);
    sort_headers(&filtered, mapping, query.sort, original, catalog)
}

fn alphabetical(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        // unaccented before accented, then lower-case before upper-case
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// Primary alphabetical key: letters folded to their unaccented ASCII form
/// and lower-cased, so "Échéance" files under E.
fn collation_key(header: &str) -> String {
    deunicode(header).to_lowercase()
}
