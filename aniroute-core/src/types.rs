//! Re-export of foundational types from `aniroute-types`.
// Consolidated re-exports so downstream crates can depend on `aniroute-core` only

pub use aniroute_types::{AnirouteError, Capability, SourceKey};

pub use aniroute_types::{
    AnirouteConfig, BrowseConfig, CacheConfig, CircuitBreakerConfig, EnrichmentConfig,
    HealthConfig, RetryConfig,
};

pub use aniroute_types::{
    AiringStatus, Anime, AnimePage, CatalogEntry, Episode, EpisodeCounts, EpisodeServer,
    EpisodeServers, MediaFormat, ServerCategory, StreamingLinks, Subtitle, VideoSource,
};

pub use aniroute_types::{BrowsePage, BrowseRequest, BrowseRequestBuilder, SortKey, SortOrder};
pub use aniroute_types::{
    CircuitSnapshot, CircuitState, HealthState, ResilienceReport, SearchAllReport, SourceFailure,
    SourceHealth, SourceStatus,
};
