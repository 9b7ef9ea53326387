//! Header-to-field suggestions.
//!
//! Each header is compared with every catalog field in three tiers:
//!
//! 1. **Exact**: the separator-free, lower-cased header equals the field's
//!    label or id. Returned immediately with score `1.0`.
//! 2. **Substring**: one normalized form contains the other (label only).
//!    Scores a fixed `0.8`.
//! 3. **Fuzzy**: best of label and id [`similarity`].
//!
//! The highest-scoring candidate wins; ties go to the field that appears
//! first in the catalog. Nothing below the minimum confidence is suggested.

use std::collections::{BTreeMap, BTreeSet};

use invoice_model::{FieldCatalog, FieldDescriptor, HeaderMapping};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::similarity::similarity;

/// Suggestions scoring below this are discarded.
pub const MIN_CONFIDENCE: f64 = 0.3;
/// Score assigned to a substring match.
pub const SUBSTRING_SCORE: f64 = 0.8;

/// Tunables for the suggester.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    pub min_confidence: f64,
    pub substring_score: f64,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            min_confidence: MIN_CONFIDENCE,
            substring_score: SUBSTRING_SCORE,
        }
    }
}

/// How a suggestion was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Substring,
    Fuzzy,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Substring => "substring",
            MatchKind::Fuzzy => "fuzzy",
        }
    }
}

/// A proposed field for one header. Recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub header: String,
    pub field: FieldDescriptor,
    /// Confidence in `(0, 1]`.
    pub score: f64,
    pub kind: MatchKind,
}

impl Suggestion {
    /// Display category of the score.
    ///
    /// A suggester configured with a `min_confidence` below the default low
    /// threshold can return scores under it; those still rate
    /// [`ConfidenceLevel::Low`].
    pub fn level(&self) -> ConfidenceLevel {
        ConfidenceThresholds::default()
            .categorize(self.score)
            .unwrap_or(ConfidenceLevel::Low)
    }
}

/// Confidence level categories for suggestion quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfidenceLevel {
    /// Weak match, needs manual confirmation.
    Low,
    /// Plausible match, should be reviewed.
    Medium,
    /// Near-certain match.
    High,
}

impl ConfidenceLevel {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "Low confidence - verify manually",
            ConfidenceLevel::Medium => "Medium confidence - review suggested",
            ConfidenceLevel::High => "High confidence",
        }
    }
}

/// Boundaries between confidence levels.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceThresholds {
    /// Minimum score for [`ConfidenceLevel::High`] (default: 0.80).
    pub high: f64,
    /// Minimum score for [`ConfidenceLevel::Medium`] (default: 0.50).
    pub medium: f64,
    /// Minimum score for [`ConfidenceLevel::Low`] (default: 0.30).
    pub low: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 0.80,
            medium: 0.50,
            low: MIN_CONFIDENCE,
        }
    }
}

impl ConfidenceThresholds {
    /// Returns `None` below the low threshold.
    #[must_use]
    pub fn categorize(&self, score: f64) -> Option<ConfidenceLevel> {
        if score >= self.high {
            Some(ConfidenceLevel::High)
        } else if score >= self.medium {
            Some(ConfidenceLevel::Medium)
        } else if score >= self.low {
            Some(ConfidenceLevel::Low)
        } else {
            None
        }
    }
}

/// Finds the best catalog field for spreadsheet headers.
#[derive(Debug, Clone, Copy)]
pub struct MatchSuggester<'a> {
    catalog: &'a FieldCatalog,
    config: SuggestConfig,
}

impl<'a> MatchSuggester<'a> {
    pub fn new(catalog: &'a FieldCatalog) -> Self {
        Self {
            catalog,
            config: SuggestConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SuggestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> &'a FieldCatalog {
        self.catalog
    }

    /// Best unused field for `header`, or `None` when nothing clears the
    /// minimum confidence. Fields whose id is in `excluded` are never returned.
    pub fn suggest(&self, header: &str, excluded: &BTreeSet<&str>) -> Option<Suggestion> {
        let normalized_header = normalize(header);
        let mut best: Option<(&FieldDescriptor, f64, MatchKind)> = None;

        for field in self.catalog {
            if excluded.contains(field.id.as_str()) {
                continue;
            }

            let normalized_label = normalize(&field.label);
            let normalized_id = normalize(&field.id);

            if normalized_header == normalized_label || normalized_header == normalized_id {
                debug!(header, field = %field.id, "exact match");
                return Some(Suggestion {
                    header: header.to_string(),
                    field: field.clone(),
                    score: 1.0,
                    kind: MatchKind::Exact,
                });
            }

            let (score, kind) = if is_substring_match(&normalized_header, &normalized_label) {
                (self.config.substring_score, MatchKind::Substring)
            } else {
                let score = similarity(header, &field.label).max(similarity(header, &field.id));
                (score, MatchKind::Fuzzy)
            };
            trace!(header, field = %field.id, score, kind = kind.as_str(), "candidate");

            if best.is_none_or(|(_, best_score, _)| score > best_score) {
                best = Some((field, score, kind));
            }
        }

        let (field, score, kind) = best?;
        if score < self.config.min_confidence {
            debug!(header, best = %field.id, score, "no field above minimum confidence");
            return None;
        }

        debug!(header, field = %field.id, score, kind = kind.as_str(), "suggested");
        Some(Suggestion {
            header: header.to_string(),
            field: field.clone(),
            score,
            kind,
        })
    }

    /// Suggest a field for every header that has no entry in `mapping`.
    ///
    /// Fields already used as values in `mapping` are excluded, so a
    /// suggestion never proposes a field another header holds. This is a
    /// single pass: two unmapped headers may receive the same suggestion until
    /// one of them is committed.
    pub fn suggest_all(
        &self,
        headers: &[String],
        mapping: &HeaderMapping,
    ) -> BTreeMap<String, Suggestion> {
        let excluded = mapping.field_ids();
        let mut suggestions = BTreeMap::new();

        for header in headers {
            if mapping.contains_header(header) || suggestions.contains_key(header) {
                continue;
            }
            if let Some(suggestion) = self.suggest(header, &excluded) {
                suggestions.insert(header.clone(), suggestion);
            }
        }

        suggestions
    }
}

/// Lower-cases and strips whitespace, hyphens and underscores.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_substring_match(header: &str, label: &str) -> bool {
    if header.is_empty() || label.is_empty() {
        return false;
    }
    label.contains(header) || header.contains(label)
}
