//! Capability flags resolved once per source at registration.

use bitflags::bitflags;

use crate::connector::AnimeSource;
use aniroute_types::Capability;

bitflags! {
    /// Set of operations a registered source can serve.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SourceCapabilities: u16 {
        /// Free-text search.
        const SEARCH = 1 << 0;
        /// Single-title lookup.
        const ANIME = 1 << 1;
        /// Episode listing.
        const EPISODES = 1 << 2;
        /// Trending listing.
        const TRENDING = 1 << 3;
        /// Recently updated listing.
        const LATEST = 1 << 4;
        /// Top-rated listing.
        const TOP_RATED = 1 << 5;
        /// Liveness probe.
        const HEALTH_CHECK = 1 << 6;
        /// Episode server listing (optional).
        const EPISODE_SERVERS = 1 << 7;
        /// Streaming link resolution (optional).
        const STREAMING_LINKS = 1 << 8;
        /// Genre listing (optional).
        const GENRE = 1 << 9;

        /// Operations every source must serve.
        const MANDATORY = Self::SEARCH.bits()
            | Self::ANIME.bits()
            | Self::EPISODES.bits()
            | Self::TRENDING.bits()
            | Self::LATEST.bits()
            | Self::TOP_RATED.bits()
            | Self::HEALTH_CHECK.bits();
    }
}

impl SourceCapabilities {
    /// Resolve the capability set of `source` from its optional-role accessors.
    #[must_use]
    pub fn probe(source: &dyn AnimeSource) -> Self {
        let mut caps = Self::MANDATORY;
        if source.as_episode_servers_provider().is_some() {
            caps |= Self::EPISODE_SERVERS;
        }
        if source.as_streaming_links_provider().is_some() {
            caps |= Self::STREAMING_LINKS;
        }
        if source.as_genre_provider().is_some() {
            caps |= Self::GENRE;
        }
        caps
    }

    /// Flags a source needs to serve `capability`.
    ///
    /// Composite operations (search-all, browse, random) map onto the listing
    /// they are built from.
    #[must_use]
    pub const fn required_for(capability: Capability) -> Self {
        match capability {
            Capability::Search | Capability::SearchAll => Self::SEARCH,
            Capability::Anime => Self::ANIME,
            Capability::Episodes => Self::EPISODES,
            Capability::Trending | Capability::Browse => Self::TRENDING,
            Capability::Latest => Self::LATEST,
            Capability::TopRated | Capability::Random => Self::TOP_RATED,
            Capability::Genre => Self::GENRE,
            Capability::EpisodeServers => Self::EPISODE_SERVERS,
            Capability::StreamingLinks => Self::STREAMING_LINKS,
            Capability::HealthCheck => Self::HEALTH_CHECK,
            _ => Self::empty(),
        }
    }

    /// Stable labels for the set flags, in declaration order.
    #[must_use]
    pub fn labels(self) -> Vec<&'static str> {
        self.iter_names()
            .filter(|(_, flag)| *flag != Self::MANDATORY)
            .map(|(name, _)| match name {
                "SEARCH" => "search",
                "ANIME" => "anime",
                "EPISODES" => "episodes",
                "TRENDING" => "trending",
                "LATEST" => "latest",
                "TOP_RATED" => "top-rated",
                "HEALTH_CHECK" => "health-check",
                "EPISODE_SERVERS" => "episode-servers",
                "STREAMING_LINKS" => "streaming-links",
                "GENRE" => "genre",
                _ => "unknown",
            })
            .collect()
    }
}
