//! Auto-save configuration.

use serde::{Deserialize, Serialize};

/// Configuration for auto-save behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Whether auto-save is enabled.
    pub enabled: bool,

    /// Quiet period in milliseconds.
    ///
    /// After an edit, the mapping is saved once no further edit arrived for
    /// this long. Each edit restarts the period.
    pub debounce_ms: u64,

    /// Optional upper bound since the first unsaved edit.
    ///
    /// When set, a save is forced after this many milliseconds even while
    /// edits keep arriving.
    pub max_delay_ms: Option<u64>,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 1000,
            max_delay_ms: None,
        }
    }
}

impl AutoSaveConfig {
    /// Create a disabled auto-save config.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Check if auto-save should trigger given the time since last edit
    /// and time since first unsaved edit.
    pub fn should_save(&self, since_last_change_ms: u64, since_first_unsaved_ms: u64) -> bool {
        if !self.enabled {
            return false;
        }

        if since_last_change_ms >= self.debounce_ms {
            return true;
        }

        self.max_delay_ms
            .is_some_and(|max| since_first_unsaved_ms >= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AutoSaveConfig::default();
        assert!(config.enabled);
        assert_eq!(config.debounce_ms, 1000);
        assert_eq!(config.max_delay_ms, None);
    }

    #[test]
    fn test_should_save_disabled() {
        let config = AutoSaveConfig::disabled();
        assert!(!config.should_save(10000, 60000));
    }

    #[test]
    fn test_should_save_debounce() {
        let config = AutoSaveConfig::default();
        assert!(!config.should_save(400, 400));
        assert!(config.should_save(1000, 1000));
    }

    #[test]
    fn test_edits_postpone_save_without_max_delay() {
        let config = AutoSaveConfig::default();
        assert!(!config.should_save(500, 120_000));
    }

    #[test]
    fn test_should_save_max_delay() {
        let config = AutoSaveConfig {
            max_delay_ms: Some(30_000),
            ..Default::default()
        };
        assert!(!config.should_save(500, 25_000));
        assert!(config.should_save(500, 35_000));
    }
}
