use std::collections::BTreeSet;

use super::normalize::normalize_title;

/// Distinct normalized tokens of a title.
#[must_use]
pub fn token_set(raw: &str) -> BTreeSet<String> {
    normalize_title(raw)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Dice coefficient over the token sets of two titles, in `[0, 1]`.
///
/// Two titles without any tokens score 0.
#[must_use]
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let ta = token_set(a);
    let tb = token_set(b);
    let total = ta.len() + tb.len();
    if total == 0 {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count();
    #[allow(clippy::cast_precision_loss)]
    let score = (2 * shared) as f64 / total as f64;
    score
}

/// Best candidate for `query` among `candidates`, scored by the highest
/// similarity of any of the candidate's titles.
///
/// Returns `None` when no candidate reaches `min_score`. Ties keep the earlier
/// candidate.
pub fn best_match<'a, T, F, I>(
    queries: &[&str],
    candidates: &'a [T],
    titles_of: F,
    min_score: f64,
) -> Option<(&'a T, f64)>
where
    F: Fn(&'a T) -> I,
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a T, f64)> = None;
    for candidate in candidates {
        let score = titles_of(candidate)
            .into_iter()
            .flat_map(|title| queries.iter().map(move |q| token_similarity(q, title)))
            .fold(0.0_f64, f64::max);
        if score >= min_score && best.is_none_or(|(_, s)| score > s) {
            best = Some((candidate, score));
        }
    }
    best
}
