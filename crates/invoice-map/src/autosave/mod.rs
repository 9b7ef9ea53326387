//! Debounced auto-save of the mapping being edited.
//!
//! Provides:
//! - `DirtyTracker` - Tracks unsaved edits; each edit restarts the quiet period
//! - `AutoSaveConfig` - Delay settings

mod config;
mod tracker;

pub use config::AutoSaveConfig;
pub use tracker::DirtyTracker;
