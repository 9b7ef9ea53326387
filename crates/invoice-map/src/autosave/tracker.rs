//! Dirty state tracking for auto-save.

use std::time::Instant;

use super::AutoSaveConfig;

/// Tracks unsaved edits to a mapping.
///
/// Rescheduling is implicit: every [`mark_dirty`](Self::mark_dirty) moves
/// the last-change instant forward, which postpones the pending save. A save
/// always writes whatever mapping exists when it fires.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    /// Whether there are unsaved edits.
    dirty: bool,

    /// When the most recent edit was made.
    last_change: Option<Instant>,

    /// When the first unsaved edit was made. Reset when saved.
    first_unsaved_change: Option<Instant>,

    /// Whether a save is currently in progress.
    saving: bool,
}

impl DirtyTracker {
    /// Create a new tracker with no unsaved edits.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Record an edit now.
    pub fn mark_dirty(&mut self) {
        self.mark_dirty_at(Instant::now());
    }

    /// Record an edit at `now`.
    pub fn mark_dirty_at(&mut self, now: Instant) {
        self.dirty = true;
        self.last_change = Some(now);
        if self.first_unsaved_change.is_none() {
            self.first_unsaved_change = Some(now);
        }
    }

    pub fn start_save(&mut self) {
        self.saving = true;
    }

    pub fn save_complete(&mut self) {
        self.dirty = false;
        self.saving = false;
        self.first_unsaved_change = None;
    }

    /// Keeps the tracker dirty so a later poll retries.
    pub fn save_failed(&mut self) {
        self.saving = false;
    }

    pub fn ms_since_last_change(&self) -> Option<u64> {
        self.ms_since_last_change_at(Instant::now())
    }

    pub fn ms_since_last_change_at(&self, now: Instant) -> Option<u64> {
        self.last_change.map(|t| elapsed_ms(t, now))
    }

    pub fn ms_since_first_unsaved_at(&self, now: Instant) -> Option<u64> {
        self.first_unsaved_change.map(|t| elapsed_ms(t, now))
    }

    /// Check if auto-save should trigger based on the config.
    pub fn should_auto_save(&self, config: &AutoSaveConfig) -> bool {
        self.should_auto_save_at(config, Instant::now())
    }

    pub fn should_auto_save_at(&self, config: &AutoSaveConfig, now: Instant) -> bool {
        if !self.dirty || self.saving || !config.enabled {
            return false;
        }

        match (
            self.ms_since_last_change_at(now),
            self.ms_since_first_unsaved_at(now),
        ) {
            (Some(since_last), Some(since_first)) => config.should_save(since_last, since_first),
            _ => false,
        }
    }
}

fn elapsed_ms(since: Instant, now: Instant) -> u64 {
    u64::try_from(now.saturating_duration_since(since).as_millis()).unwrap_or(u64::MAX)
}
