//! aniroute-specific data transfer objects, error taxonomy, and configuration primitives.
#![warn(missing_docs)]

mod browse;
mod capability;
mod config;
mod error;
mod health;
mod model;
mod reports;
mod source;

pub use browse::{BrowseRequest, BrowseRequestBuilder, SortKey, SortOrder};
pub use capability::Capability;
pub use config::{
    AnirouteConfig, BrowseConfig, CacheConfig, CircuitBreakerConfig, EnrichmentConfig,
    HealthConfig, RetryConfig,
};
pub use error::AnirouteError;
pub use health::{
    CircuitSnapshot, CircuitState, HealthState, ResilienceReport, SourceHealth, SourceStatus,
};
pub use model::{
    AiringStatus, Anime, AnimePage, CatalogEntry, Episode, EpisodeCounts, EpisodeServer,
    EpisodeServers, MediaFormat, ServerCategory, StreamingLinks, Subtitle, VideoSource,
};
pub use reports::{BrowsePage, SearchAllReport, SourceFailure};
pub use source::SourceKey;
