//! Configuration types shared across the orchestrator and middleware.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::EpisodeServer;

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one (>= 1).
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each attempt after that.
    pub base_delay: Duration,
}

impl RetryConfig {
    /// Delay to wait after the failed attempt number `attempt` (1-based):
    /// `base * 2^(attempt-1)`, saturating.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exp)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Per-source failure-count circuit breaker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive countable failures that trip the breaker.
    pub failure_threshold: u32,
    /// Time an open breaker waits before admitting a half-open trial.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_millis(15_000),
        }
    }
}

/// Periodic health probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Time between probe cycles.
    pub interval: Duration,
    /// Deadline for a single source probe.
    pub probe_timeout: Duration,
    /// Probes slower than this mark the source degraded (it stays available).
    pub degraded_latency: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(120),
            probe_timeout: Duration::from_millis(5000),
            degraded_latency: Duration::from_millis(3000),
        }
    }
}

/// Cross-catalog enrichment and fuzzy matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Listing pages (trending and top-rated each) used to build the lookup table.
    pub lookup_pages: u32,
    /// How long a built lookup table is reused before a rebuild.
    pub lookup_ttl: Duration,
    /// Minimum token-overlap similarity for a live-search match to be accepted.
    pub min_similarity: f64,
    /// Source whose catalog feeds the lookup table; `None` uses priority selection.
    pub lookup_source: Option<String>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            lookup_pages: 3,
            lookup_ttl: Duration::from_secs(30 * 60),
            min_similarity: 0.5,
            lookup_source: None,
        }
    }
}

/// Browsing prefetch and random-pick settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseConfig {
    /// Listing pages fetched concurrently before local filtering.
    pub prefetch_pages: u32,
    /// Upper bound for the random top-rated page used by random picks.
    pub random_page_span: u32,
    /// Page size requested from top-rated listings.
    pub top_rated_limit: u32,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            prefetch_pages: 3,
            random_page_span: 5,
            top_rated_limit: 24,
        }
    }
}

/// Response cache settings for the caching middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached responses per wrapped source.
    pub max_entries: u64,
    /// Time-to-live for listing and search responses.
    pub listing_ttl: Duration,
    /// Time-to-live for detail and episode responses.
    pub detail_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1024,
            listing_ttl: Duration::from_secs(5 * 60),
            detail_ttl: Duration::from_secs(30 * 60),
        }
    }
}

/// Global configuration for the `SourceManager` orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnirouteConfig {
    /// Retry policy applied to every outbound source call.
    pub retry: RetryConfig,
    /// Deadline for a single attempt against a source.
    pub call_timeout: Duration,
    /// Calls slower than this emit a slow-operation warning.
    pub slow_call_threshold: Duration,
    /// Breaker settings shared by all per-source breakers.
    pub circuit_breaker: CircuitBreakerConfig,
    /// Health probing settings.
    pub health: HealthConfig,
    /// Global ceiling of in-flight outbound calls.
    pub max_in_flight: usize,
    /// `search_all` stops once this many results have been accumulated.
    pub search_all_threshold: usize,
    /// Cross-catalog enrichment settings.
    pub enrichment: EnrichmentConfig,
    /// Browse/random settings.
    pub browse: BrowseConfig,
    /// Servers offered for an episode when no source lists any.
    #[serde(default)]
    pub fallback_servers: Vec<EpisodeServer>,
}

impl Default for AnirouteConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            call_timeout: Duration::from_millis(8000),
            slow_call_threshold: Duration::from_millis(3000),
            circuit_breaker: CircuitBreakerConfig::default(),
            health: HealthConfig::default(),
            max_in_flight: 6,
            search_all_threshold: 20,
            enrichment: EnrichmentConfig::default(),
            browse: BrowseConfig::default(),
            fallback_servers: Vec::new(),
        }
    }
}
