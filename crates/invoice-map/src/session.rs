//! Interactive mapping session.
//!
//! A [`MappingSession`] is what an upload dialog holds while the user maps
//! spreadsheet headers: the durable mapping plus transient view state
//! (search, filters, per-header field search) and the auto-save tracker.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use invoice_model::{FieldCatalog, FieldCategory, FieldDescriptor, HeaderMapping, MappingTarget};
use tracing::{debug, info, warn};

use crate::autosave::{AutoSaveConfig, DirtyTracker};
use crate::error::{MappingError, PersistenceError, SaveError};
use crate::progress::{ProgressSnapshot, progress};
use crate::storage::{MappingStorage, load_or_default};
use crate::store::MappingStore;
use crate::suggest::{MatchSuggester, SuggestConfig, Suggestion};
use crate::view::{FilterMode, HeaderQuery, SortMode, view};

/// Transient UI state, separate from the mapping itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Header search, filter and sort.
    pub query: HeaderQuery,
    /// Restricts field pickers to one catalog section.
    pub active_category: Option<FieldCategory>,
    /// Per-header search text typed into the field picker.
    pub field_search: BTreeMap<String, String>,
}

/// One entry of a header's field picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOption<'a> {
    pub field: &'a FieldDescriptor,
    /// Another header already mapped to this field.
    pub claimed_by: Option<&'a str>,
    /// The header currently maps to this field.
    pub selected: bool,
}

impl FieldOption<'_> {
    /// Options held by another header are shown but not selectable.
    pub fn disabled(&self) -> bool {
        self.claimed_by.is_some()
    }
}

/// State of one header-mapping dialog.
#[derive(Debug, Clone)]
pub struct MappingSession {
    catalog: FieldCatalog,
    headers: Vec<String>,
    original_order: Vec<String>,
    store: MappingStore,
    view: ViewState,
    tracker: DirtyTracker,
    autosave: AutoSaveConfig,
    suggest_config: SuggestConfig,
    storage_key: String,
}

impl MappingSession {
    /// Start a session with an empty mapping.
    pub fn new(catalog: FieldCatalog, headers: Vec<String>, storage_key: impl Into<String>) -> Self {
        Self {
            catalog,
            original_order: headers.clone(),
            headers,
            store: MappingStore::new(),
            view: ViewState::default(),
            tracker: DirtyTracker::new(),
            autosave: AutoSaveConfig::default(),
            suggest_config: SuggestConfig::default(),
            storage_key: storage_key.into(),
        }
    }

    /// Start a session seeded from whatever `storage` holds under `storage_key`.
    ///
    /// Unreadable stored data yields an empty mapping.
    pub fn open(
        catalog: FieldCatalog,
        headers: Vec<String>,
        storage: &dyn MappingStorage,
        storage_key: impl Into<String>,
    ) -> Self {
        let storage_key = storage_key.into();
        let mapping = load_or_default(storage, &storage_key);
        let session = Self::new(catalog, headers, storage_key).with_mapping(mapping);
        for header in session.orphaned_headers() {
            warn!(header, "saved mapping refers to a field that no longer exists");
        }
        session
    }

    /// Replace the mapping without marking the session dirty.
    #[must_use]
    pub fn with_mapping(mut self, mapping: HeaderMapping) -> Self {
        self.store = MappingStore::from_mapping(mapping);
        self
    }

    #[must_use]
    pub fn with_autosave(mut self, config: AutoSaveConfig) -> Self {
        self.autosave = config;
        self
    }

    #[must_use]
    pub fn with_suggest_config(mut self, config: SuggestConfig) -> Self {
        self.suggest_config = config;
        self
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn mapping(&self) -> &HeaderMapping {
        self.store.mapping()
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }

    // =========================================================================
    // Suggestions
    // =========================================================================

    fn suggester(&self) -> MatchSuggester<'_> {
        MatchSuggester::new(&self.catalog).with_config(self.suggest_config)
    }

    /// Suggestions for every header without a mapping entry.
    pub fn suggestions(&self) -> BTreeMap<String, Suggestion> {
        self.suggester().suggest_all(&self.headers, self.store.mapping())
    }

    pub fn suggestion_for(&self, header: &str) -> Option<Suggestion> {
        if self.store.get(header).is_some() {
            return None;
        }
        self.suggester()
            .suggest(header, &self.store.mapping().field_ids())
    }

    /// Commit the current suggestion for `header`.
    pub fn accept_suggestion(&mut self, header: &str) -> Result<String, MappingError> {
        self.ensure_header(header)?;
        let suggestion = self
            .suggestion_for(header)
            .ok_or_else(|| MappingError::NoSuggestion(header.to_string()))?;
        self.store.try_set(header, &suggestion.field.id)?;
        self.tracker.mark_dirty();
        Ok(suggestion.field.id)
    }

    /// Commit suggestions in header order, skipping any whose field was taken
    /// by an earlier acceptance in the same pass.
    ///
    /// Returns the headers that were mapped.
    pub fn accept_all_suggestions(&mut self) -> Vec<String> {
        let suggestions = self.suggestions();
        let mut accepted = Vec::new();

        for header in &self.headers {
            let Some(suggestion) = suggestions.get(header) else {
                continue;
            };
            if self.store.get(header).is_some() || self.store.is_claimed(&suggestion.field.id) {
                debug!(header, field = %suggestion.field.id, "suggestion superseded");
                continue;
            }
            self.store.set(header, &suggestion.field.id);
            accepted.push(header.clone());
        }

        if !accepted.is_empty() {
            info!(count = accepted.len(), "accepted suggestions");
            self.tracker.mark_dirty();
        }
        accepted
    }

    // =========================================================================
    // Edits
    // =========================================================================

    fn ensure_header(&self, header: &str) -> Result<(), MappingError> {
        if self.headers.iter().any(|h| h == header) {
            Ok(())
        } else {
            Err(MappingError::HeaderNotFound(header.to_string()))
        }
    }

    fn ensure_field(&self, field_id: &str) -> Result<(), MappingError> {
        if self.catalog.contains(field_id) {
            Ok(())
        } else {
            Err(MappingError::FieldNotFound(field_id.to_string()))
        }
    }

    /// Map `header` to `field_id`, overwriting without a conflict check.
    pub fn set_field(
        &mut self,
        header: &str,
        field_id: &str,
    ) -> Result<Option<MappingTarget>, MappingError> {
        self.ensure_header(header)?;
        self.ensure_field(field_id)?;
        let previous = self.store.set(header, field_id);
        self.tracker.mark_dirty();
        Ok(previous)
    }

    /// Map `header` to `field_id`, refusing a field another header holds.
    pub fn assign_field(
        &mut self,
        header: &str,
        field_id: &str,
    ) -> Result<Option<MappingTarget>, MappingError> {
        self.ensure_header(header)?;
        self.ensure_field(field_id)?;
        let previous = self.store.try_set(header, field_id)?;
        self.tracker.mark_dirty();
        Ok(previous)
    }

    /// Map `header` to `field_id`, unmapping whichever header held it.
    pub fn reassign_field(
        &mut self,
        header: &str,
        field_id: &str,
    ) -> Result<Vec<String>, MappingError> {
        self.ensure_header(header)?;
        self.ensure_field(field_id)?;
        let cleared = self.store.reassign(header, field_id);
        self.tracker.mark_dirty();
        Ok(cleared)
    }

    pub fn skip(&mut self, header: &str) -> Result<(), MappingError> {
        self.ensure_header(header)?;
        self.store.skip(header);
        self.tracker.mark_dirty();
        Ok(())
    }

    /// Remove the entry for `header`. Returns whether there was one.
    pub fn clear(&mut self, header: &str) -> bool {
        let removed = self.store.remove(header).is_some();
        if removed {
            self.tracker.mark_dirty();
        }
        removed
    }

    // =========================================================================
    // View state
    // =========================================================================

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.view.query.search = search.into();
    }

    pub fn set_filter(&mut self, filter: FilterMode) {
        self.view.query.filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.view.query.sort = sort;
    }

    pub fn set_active_category(&mut self, category: Option<FieldCategory>) {
        self.view.active_category = category;
    }

    pub fn set_field_search(&mut self, header: &str, search: impl Into<String>) {
        let search = search.into();
        if search.is_empty() {
            self.view.field_search.remove(header);
        } else {
            self.view.field_search.insert(header.to_string(), search);
        }
    }

    /// Headers as currently displayed.
    pub fn visible_headers(&self) -> Vec<String> {
        view(
            &self.headers,
            &self.view.query,
            self.store.mapping(),
            &self.catalog,
            &self.original_order,
        )
    }

    /// Field picker entries for `header`, honouring the active category and
    /// the header's field search.
    pub fn field_options(&self, header: &str) -> Vec<FieldOption<'_>> {
        let needle = self
            .view
            .field_search
            .get(header)
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        let current = self.store.mapping().field_for(header);

        self.catalog
            .iter()
            .filter(|f| self.view.active_category.is_none_or(|c| f.category == c))
            .filter(|f| {
                needle.is_empty()
                    || f.label.to_lowercase().contains(&needle)
                    || f.id.to_lowercase().contains(&needle)
            })
            .map(|field| FieldOption {
                field,
                claimed_by: self.store.claimed_by(&field.id, Some(header)),
                selected: current == Some(field.id.as_str()),
            })
            .collect()
    }

    // =========================================================================
    // Progress and validation
    // =========================================================================

    pub fn progress(&self) -> ProgressSnapshot {
        progress(&self.headers, self.store.mapping(), &self.catalog)
    }

    /// Required fields no header maps to, in catalog order.
    pub fn unmapped_required_fields(&self) -> Vec<&FieldDescriptor> {
        let used: BTreeSet<&str> = self.store.mapping().field_ids();
        self.catalog
            .required_fields()
            .filter(|f| !used.contains(f.id.as_str()))
            .collect()
    }

    pub fn can_finalize(&self) -> bool {
        self.unmapped_required_fields().is_empty()
    }

    /// Headers whose stored field id is not in the catalog.
    pub fn orphaned_headers(&self) -> Vec<&str> {
        self.store
            .mapping()
            .iter()
            .filter_map(|(header, target)| {
                let id = target.field_id()?;
                (!self.catalog.contains(id)).then_some(header)
            })
            .collect()
    }

    /// The mapping, provided every required field is mapped.
    pub fn finalize(&self) -> Result<HeaderMapping, MappingError> {
        let missing = self.unmapped_required_fields();
        if !missing.is_empty() {
            return Err(MappingError::RequiredFieldsUnmapped(
                missing.into_iter().map(|f| f.id.clone()).collect(),
            ));
        }
        Ok(self.store.mapping().clone())
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the current mapping now, whatever its completeness.
    ///
    /// On failure the mapping stays in memory and the session stays dirty.
    pub fn flush(&mut self, storage: &dyn MappingStorage) -> Result<(), PersistenceError> {
        self.tracker.start_save();
        match storage.save(&self.storage_key, self.store.mapping()) {
            Ok(()) => {
                self.tracker.save_complete();
                Ok(())
            }
            Err(error) => {
                warn!(key = %self.storage_key, %error, "failed to save mapping");
                self.tracker.save_failed();
                Err(error)
            }
        }
    }

    /// Save if the quiet period since the last edit has elapsed.
    ///
    /// Returns whether a save happened.
    pub fn poll_auto_save(&mut self, storage: &dyn MappingStorage) -> Result<bool, PersistenceError> {
        self.poll_auto_save_at(storage, Instant::now())
    }

    pub fn poll_auto_save_at(
        &mut self,
        storage: &dyn MappingStorage,
        now: Instant,
    ) -> Result<bool, PersistenceError> {
        if !self.tracker.should_auto_save_at(&self.autosave, now) {
            return Ok(false);
        }
        debug!(key = %self.storage_key, "auto-saving mapping");
        self.flush(storage)?;
        Ok(true)
    }

    /// Explicit save: blocked until every required field is mapped.
    pub fn save(&mut self, storage: &dyn MappingStorage) -> Result<HeaderMapping, SaveError> {
        let mapping = self.finalize()?;
        self.flush(storage)?;
        Ok(mapping)
    }
}
