use core::fmt;
use serde::{Deserialize, Serialize};

/// High-level capability labels for routing, errors, and telemetry.
///
/// These map one-to-one with orchestrator operations and allow consistent
/// Display formatting and match-exhaustive handling when adding new
/// capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Capability {
    /// Free-text title search against one source.
    Search,
    /// Sequential multi-source search with aggregation.
    SearchAll,
    /// Detail lookup by content identifier.
    Anime,
    /// Episode list for a content identifier.
    Episodes,
    /// Trending listing.
    Trending,
    /// Recently updated listing.
    Latest,
    /// Top-rated listing.
    TopRated,
    /// Genre listing (optional per source).
    Genre,
    /// Random pick from a source catalog.
    Random,
    /// Filtered, sorted, paginated browsing.
    Browse,
    /// Episode server list (optional per source).
    EpisodeServers,
    /// Streaming link resolution (optional per source).
    StreamingLinks,
    /// Lightweight liveness probe.
    HealthCheck,
    /// Query against the enrichment catalog.
    Catalog,
}

impl Capability {
    /// Stable, kebab-case identifier for logs/errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::SearchAll => "search-all",
            Self::Anime => "anime",
            Self::Episodes => "episodes",
            Self::Trending => "trending",
            Self::Latest => "latest",
            Self::TopRated => "top-rated",
            Self::Genre => "genre",
            Self::Random => "random",
            Self::Browse => "browse",
            Self::EpisodeServers => "episode-servers",
            Self::StreamingLinks => "streaming-links",
            Self::HealthCheck => "health-check",
            Self::Catalog => "catalog",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
