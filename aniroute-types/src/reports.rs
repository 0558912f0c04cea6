//! Report envelopes produced by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::model::{Anime, AnimePage};

/// Why a source did not contribute to an aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    /// Source name.
    pub provider: String,
    /// Human-readable reason (error message, "no results", "unavailable").
    pub message: String,
}

impl SourceFailure {
    /// Convenience constructor.
    pub fn new(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Summary of a sequential multi-source search.
///
/// `page.source` is the `+`-joined list of contributing sources.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchAllReport {
    /// Combined results in priority order.
    pub page: AnimePage,
    /// Sources that returned at least one hit, in the order they were queried.
    pub sources: Vec<String>,
    /// Sources that failed or returned nothing.
    pub failures: Vec<SourceFailure>,
}

/// One page of browse results after local filtering and sorting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BrowsePage {
    /// Results on this page.
    pub results: Vec<Anime>,
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub per_page: u32,
    /// Matching results across all pages.
    pub total_results: usize,
    /// Number of pages at `per_page`.
    pub total_pages: u32,
    /// Whether another page exists.
    pub has_next_page: bool,
    /// Provenance label (`+`-joined).
    pub source: String,
}
