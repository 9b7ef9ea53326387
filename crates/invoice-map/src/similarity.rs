//! Edit-distance similarity between two strings.

use rapidfuzz::distance::levenshtein;

/// Normalized Levenshtein similarity in `[0, 1]`.
///
/// Comparison is case-insensitive. Equal strings score `1.0`; an empty string
/// against a non-empty one scores `0.0`. Otherwise the score is
/// `1 - distance / max(len(a), len(b))` with lengths counted in characters.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let longest = a.chars().count().max(b.chars().count());
    let distance = levenshtein::distance(a.chars(), b.chars());
    1.0 - distance as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_ignoring_case() {
        assert_eq!(similarity("Invoice Number", "invoice number"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn empty_against_non_empty() {
        assert_eq!(similarity("", "TIN"), 0.0);
        assert_eq!(similarity("TIN", ""), 0.0);
    }

    #[test]
    fn known_distances() {
        // kitten -> sitting: 3 edits over 7 characters
        let score = similarity("kitten", "sitting");
        assert!((score - (1.0 - 3.0 / 7.0)).abs() < 1e-12);

        // one substitution over 3 characters
        let score = similarity("TIN", "pin");
        assert!((score - (1.0 - 1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn completely_different() {
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    proptest! {
        #[test]
        fn score_is_within_unit_range(a in ".{0,24}", b in ".{0,24}") {
            let score = similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&score));
        }

        #[test]
        fn score_is_symmetric(a in "[a-zA-Z _-]{0,20}", b in "[a-zA-Z _-]{0,20}") {
            prop_assert_eq!(similarity(&a, &b), similarity(&b, &a));
        }

        #[test]
        fn self_similarity_is_one(s in "[a-zA-Z0-9 ]{1,30}") {
            prop_assert_eq!(similarity(&s, &s), 1.0);
        }

        #[test]
        fn empty_scores_zero(s in "[a-z]{1,30}") {
            prop_assert_eq!(similarity("", &s), 0.0);
        }
    }
}
