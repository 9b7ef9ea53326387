use std::collections::BTreeMap;
use std::path::PathBuf;

use invoice_map::{MappingSession, Suggestion};

#[derive(Debug)]
pub struct SuggestResult {
    pub file: PathBuf,
    pub headers: Vec<String>,
    pub suggestions: BTreeMap<String, Suggestion>,
}

#[derive(Debug)]
pub struct MapResult {
    pub file: PathBuf,
    pub session: MappingSession,
    /// Headers mapped by `--accept-suggestions`.
    pub accepted: Vec<String>,
    /// Headers that lost their field to a forced `--set`.
    pub displaced: Vec<String>,
    /// File written, if any.
    pub saved_to: Option<PathBuf>,
    /// Required field ids still unmapped when `--finalize` was requested.
    pub missing_required: Vec<String>,
}

impl MapResult {
    pub fn is_blocked(&self) -> bool {
        !self.missing_required.is_empty()
    }
}
