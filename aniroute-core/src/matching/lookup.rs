use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::normalize::{normalize_title, title_variants};

/// Normalized-title index over a set of records.
///
/// Built in two passes so that a record's exact title always wins over a
/// key another record only produces after stripping decorations:
/// 1. every full normalized title is inserted (first record wins);
/// 2. every derived variant is inserted only where the key is still vacant.
///
/// Lookups walk the query's own variants from most to least specific, so each
/// resolution costs a handful of hash probes.
#[derive(Debug, Clone)]
pub struct LookupTable<T> {
    index: HashMap<String, T>,
}

impl<T> Default for LookupTable<T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
        }
    }
}

impl<T: Clone> LookupTable<T> {
    /// Build an index over `records`, keyed by every title `titles_of` yields.
    pub fn build<F, S>(records: &[T], titles_of: F) -> Self
    where
        F: Fn(&T) -> Vec<S>,
        S: AsRef<str>,
    {
        let mut index = HashMap::new();
        for record in records {
            for title in titles_of(record) {
                let key = normalize_title(title.as_ref());
                if !key.is_empty() {
                    index.entry(key).or_insert_with(|| record.clone());
                }
            }
        }
        for record in records {
            for title in titles_of(record) {
                for key in title_variants(title.as_ref()).into_iter().skip(1) {
                    if let Entry::Vacant(slot) = index.entry(key) {
                        slot.insert(record.clone());
                    }
                }
            }
        }
        Self { index }
    }

    /// Resolve `title` to a record, trying its variants in order.
    #[must_use]
    pub fn get(&self, title: &str) -> Option<&T> {
        title_variants(title)
            .iter()
            .find_map(|key| self.index.get(key))
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True when the table holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
