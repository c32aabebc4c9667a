//! Jaccard word-set similarity between two titles.

use std::collections::HashSet;

/// Unique lowercase tokens of a title, ignoring tokens of length <= 2.
///
/// Short tokens ("a", "to", "el", "de") carry no matching signal and would
/// inflate scores between unrelated titles.
fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

/// Similarity score between two titles in `[0, 1]`.
///
/// Jaccard index over unique word sets: `|intersection| / |union|`. No
/// stemming, no synonyms, no positional weighting. Returns `0.0` when either
/// side has no usable tokens — an empty title is a non-match, not an error.
#[must_use]
pub fn jaccard_score(a: &str, b: &str) -> f64 {
    let set_a = token_set(a);
    let set_b = token_set(b);

    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();

    intersection as f64 / union as f64
}
