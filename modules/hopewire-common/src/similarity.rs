//! Title normalization and word-overlap similarity.
//!
//! Used in two places with the same threshold: the aggregator's cross-provider
//! batch dedup and the persistence filter's cross-cycle dedup.

use std::collections::HashSet;

/// Two titles at or above this Jaccard overlap describe the same story.
pub const TITLE_SIMILARITY_THRESHOLD: f64 = 0.70;

/// Lowercase, strip punctuation, collapse whitespace.
pub fn normalize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut last_space = true;
    for c in title.trim().chars() {
        if c.is_alphanumeric() {
            for lc in c.to_lowercase() {
                out.push(lc);
            }
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Word-level Jaccard overlap of two normalized titles, in [0, 1].
/// Two empty titles are treated as non-matching rather than identical.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let tokens_a: HashSet<&str> = a.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    intersection as f64 / union as f64
}

/// Convenience: normalize both titles and compare against the threshold.
pub fn titles_match(a: &str, b: &str) -> bool {
    title_similarity(&normalize_title(a), &normalize_title(b)) >= TITLE_SIMILARITY_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_punctuation_and_case() {
        assert_eq!(
            normalize_title("  Scientists CURE rare disease, in trial!  "),
            "scientists cure rare disease in trial"
        );
    }

    #[test]
    fn near_identical_titles_match() {
        // One inserted stopword: 6 shared tokens, 7 in the union → 0.857.
        assert!(titles_match(
            "Scientists cure rare disease in trial",
            "Scientists cure a rare disease in trial"
        ));
    }

    #[test]
    fn unrelated_titles_do_not_match() {
        assert!(!titles_match(
            "Scientists cure rare disease in trial",
            "City council approves new park budget"
        ));
    }

    #[test]
    fn similarity_below_threshold_retains_both() {
        let a = normalize_title("Global markets rally after rate cut");
        let b = normalize_title("Global markets slide on rate fears");
        assert!(title_similarity(&a, &b) < TITLE_SIMILARITY_THRESHOLD);
    }

    #[test]
    fn empty_titles_never_match() {
        assert_eq!(title_similarity("", ""), 0.0);
        assert!(!titles_match("", ""));
    }

    #[test]
    fn identical_titles_have_full_overlap() {
        let t = normalize_title("Volunteers rebuild flooded school");
        assert_eq!(title_similarity(&t, &t), 1.0);
    }
}
