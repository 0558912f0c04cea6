use std::sync::LazyLock;

use regex::Regex;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("static regex"));
static TRAILING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s(?:19|20)\d{2}$").expect("static regex"));
static SEASON_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:season\s*\d+|\d+(?:st|nd|rd|th)\s+season|s\d{1,2}|final\s+season)\b")
        .expect("static regex")
});
static LEADING_THE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^the\s+").expect("static regex"));
static PART_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:part|cour)\s*\d+\b|\b\d+(?:st|nd|rd|th)\s+(?:part|cour)\b")
        .expect("static regex")
});
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Canonical comparison form of a title: lowercase, punctuation folded to
/// single spaces, trimmed.
///
/// ```
/// use aniroute_core::matching::normalize_title;
/// assert_eq!(normalize_title("  Re:ZERO -Starting Life-  "), "re zero starting life");
/// ```
#[must_use]
pub fn normalize_title(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    NON_ALNUM.replace_all(&lowered, " ").trim().to_string()
}

/// Free-text search query for a decorated catalog title: the normalized
/// title without a trailing year.
///
/// ```
/// use aniroute_core::matching::search_query;
/// assert_eq!(search_query("Naruto (2002)"), "naruto");
/// assert_eq!(search_query("1999"), "1999");
/// ```
#[must_use]
pub fn search_query(raw: &str) -> String {
    let normalized = normalize_title(raw);
    let stripped = TRAILING_YEAR.replace(&normalized, "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        normalized
    } else {
        stripped.to_string()
    }
}

fn collapse(s: &str) -> String {
    SPACES.replace_all(s, " ").trim().to_string()
}

/// Lookup keys for `raw`, most specific first, without duplicates or empty keys.
///
/// The first key is always the full normalized title. Each following key
/// strips one more decoration from the previous one: a trailing year, season
/// markers, a leading article, part or cour numbers. The last key is the
/// normalized text before the first colon when the title has a subtitle.
#[must_use]
pub fn title_variants(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(6);
    let mut push = |candidate: String| {
        if !candidate.is_empty() && !out.contains(&candidate) {
            out.push(candidate);
        }
    };

    let mut current = normalize_title(raw);
    push(current.clone());

    let strippers: [&LazyLock<Regex>; 4] =
        [&TRAILING_YEAR, &SEASON_MARKER, &LEADING_THE, &PART_NUMBER];
    for re in strippers {
        let next = collapse(&re.replace_all(&current, " "));
        if !next.is_empty() {
            current = next;
            push(current.clone());
        }
    }

    if let Some((head, _)) = raw.split_once(':') {
        push(normalize_title(head));
    }
    out
}
