use async_trait::async_trait;

use crate::AnirouteError;
pub use aniroute_types::SourceKey;
use aniroute_types::{
    Anime, AnimePage, CatalogEntry, Episode, EpisodeServers, ServerCategory, StreamingLinks,
};

/// Focused role trait for sources that resolve playable links for an episode.
#[async_trait]
pub trait StreamingLinksProvider: Send + Sync {
    /// Resolve streaming links for `episode_id`.
    ///
    /// `server` and `category` narrow the choice when the source offers several
    /// servers; `None` lets the source pick its default.
    async fn streaming_links(
        &self,
        episode_id: &str,
        server: Option<&str>,
        category: Option<ServerCategory>,
    ) -> Result<StreamingLinks, AnirouteError>;
}

/// Focused role trait for sources that list streaming servers for an episode.
#[async_trait]
pub trait EpisodeServersProvider: Send + Sync {
    /// List the servers available for `episode_id`.
    async fn episode_servers(&self, episode_id: &str) -> Result<EpisodeServers, AnirouteError>;
}

/// Focused role trait for sources that can list titles by genre.
#[async_trait]
pub trait GenreProvider: Send + Sync {
    /// Fetch one page of titles tagged with `genre`.
    async fn by_genre(&self, genre: &str, page: u32) -> Result<AnimePage, AnirouteError>;
}

/// A higher-fidelity metadata catalog consulted for genre queries.
///
/// Catalog entries are not playable; the orchestrator resolves each entry to a
/// record on a streaming source by title before returning it.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// A stable identifier used in logs.
    fn name(&self) -> &'static str;

    /// Fetch one page of entries carrying every genre in `genres`.
    async fn by_genres(
        &self,
        genres: &[String],
        page: u32,
    ) -> Result<Vec<CatalogEntry>, AnirouteError>;
}

/// Main source trait implemented by adapter crates. Exposes capability discovery.
///
/// The listing and lookup operations are mandatory. Optional capabilities are
/// advertised through the `as_*_provider` accessors; the orchestrator resolves
/// them once at registration.
#[async_trait]
pub trait AnimeSource: Send + Sync {
    /// A stable identifier for priority lists and ID routing (e.g., "hianime").
    fn name(&self) -> &'static str;

    /// Canonical source key constructed from the static name.
    fn key(&self) -> SourceKey {
        SourceKey::new(self.name())
    }

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Free-text title search.
    async fn search(&self, query: &str, page: u32) -> Result<AnimePage, AnirouteError>;

    /// Look up a single title. `Ok(None)` means the source does not know the id.
    async fn anime(&self, id: &str) -> Result<Option<Anime>, AnirouteError>;

    /// List the episodes of a title.
    async fn episodes(&self, anime_id: &str) -> Result<Vec<Episode>, AnirouteError>;

    /// Currently trending titles.
    async fn trending(&self, page: u32) -> Result<AnimePage, AnirouteError>;

    /// Recently updated titles.
    async fn latest(&self, page: u32) -> Result<AnimePage, AnirouteError>;

    /// Highest-rated titles, `limit` per page.
    async fn top_rated(&self, page: u32, limit: u32) -> Result<AnimePage, AnirouteError>;

    /// Cheap liveness probe. `Ok(false)` and `Err(_)` both mark the source offline.
    async fn health_check(&self) -> Result<bool, AnirouteError>;

    /// If implemented, returns a trait object for streaming link resolution.
    fn as_streaming_links_provider(&self) -> Option<&dyn StreamingLinksProvider> {
        None
    }
    /// If implemented, returns a trait object for episode server listing.
    fn as_episode_servers_provider(&self) -> Option<&dyn EpisodeServersProvider> {
        None
    }
    /// If implemented, returns a trait object for genre listing.
    fn as_genre_provider(&self) -> Option<&dyn GenreProvider> {
        None
    }
}

/// Generate `as_*_provider` accessors for a wrapper that implements
/// `AnimeSource` by delegating to an inner field.
///
/// The wrapper must itself implement every optional role trait; each accessor
/// advertises the wrapper only when the inner source advertises the capability.
#[macro_export]
macro_rules! aniroute_source_accessors {
    ($inner:ident) => {
        fn as_streaming_links_provider(
            &self,
        ) -> Option<&dyn $crate::connector::StreamingLinksProvider> {
            if self.$inner.as_streaming_links_provider().is_some() {
                Some(self as &dyn $crate::connector::StreamingLinksProvider)
            } else {
                None
            }
        }
        fn as_episode_servers_provider(
            &self,
        ) -> Option<&dyn $crate::connector::EpisodeServersProvider> {
            if self.$inner.as_episode_servers_provider().is_some() {
                Some(self as &dyn $crate::connector::EpisodeServersProvider)
            } else {
                None
            }
        }
        fn as_genre_provider(&self) -> Option<&dyn $crate::connector::GenreProvider> {
            if self.$inner.as_genre_provider().is_some() {
                Some(self as &dyn $crate::connector::GenreProvider)
            } else {
                None
            }
        }
    };
}
