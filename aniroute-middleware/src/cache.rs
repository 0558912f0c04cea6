use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;

use aniroute_core::connector::{
    AnimeSource, EpisodeServersProvider, GenreProvider, StreamingLinksProvider,
};
use aniroute_core::{
    AnirouteError, Anime, AnimePage, CacheConfig, Episode, EpisodeServers, ServerCategory,
    StreamingLinks,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ListingKey {
    Search { query: String, page: u32 },
    Trending(u32),
    Latest(u32),
    TopRated { page: u32, limit: u32 },
    Genre { genre: String, page: u32 },
}

/// Declarative wrapper that applies response caching when building a source stack.
pub struct CacheMiddleware {
    cfg: CacheConfig,
}

impl CacheMiddleware {
    /// Cache wrapped sources with the given capacity and TTLs.
    #[must_use]
    pub const fn new(cfg: CacheConfig) -> Self {
        Self { cfg }
    }
}

impl aniroute_core::Middleware for CacheMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn AnimeSource>) -> Arc<dyn AnimeSource> {
        let Self { cfg } = *self;
        Arc::new(CachingSource::new(inner, &cfg))
    }

    fn name(&self) -> &'static str {
        "CachingMiddleware"
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({
            "max_entries": self.cfg.max_entries,
            "listing_ttl_ms": u64::try_from(self.cfg.listing_ttl.as_millis()).unwrap_or(u64::MAX),
            "detail_ttl_ms": u64::try_from(self.cfg.detail_ttl.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

/// Source wrapper that memoizes listing, detail, and episode responses.
///
/// Only successful, non-empty responses are stored, so an empty page still
/// reaches the orchestrator's fallback on the next call. Streaming links and
/// server lists are passed through uncached because media URLs expire.
pub struct CachingSource {
    inner: Arc<dyn AnimeSource>,
    listings: Cache<ListingKey, AnimePage>,
    details: Cache<String, Anime>,
    episodes: Cache<String, Vec<Episode>>,
}

impl CachingSource {
    /// Wrap `inner`. Each response kind gets its own cache of up to
    /// `cfg.max_entries` entries; listings and details expire separately.
    #[must_use]
    pub fn new(inner: Arc<dyn AnimeSource>, cfg: &CacheConfig) -> Self {
        let capacity = cfg.max_entries.max(1);
        Self {
            inner,
            listings: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(cfg.listing_ttl)
                .build(),
            details: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(cfg.detail_ttl)
                .build(),
            episodes: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(cfg.detail_ttl)
                .build(),
        }
    }

    async fn listing<F, Fut>(&self, key: ListingKey, fetch: F) -> Result<AnimePage, AnirouteError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: std::future::Future<Output = Result<AnimePage, AnirouteError>> + Send,
    {
        if let Some(page) = self.listings.get(&key).await {
            return Ok(page);
        }
        let page = fetch().await?;
        if !page.is_empty() {
            self.listings.insert(key, page.clone()).await;
        }
        Ok(page)
    }
}

#[async_trait]
impl AnimeSource for CachingSource {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn vendor(&self) -> &'static str {
        self.inner.vendor()
    }

    async fn search(&self, query: &str, page: u32) -> Result<AnimePage, AnirouteError> {
        let key = ListingKey::Search {
            query: query.to_string(),
            page,
        };
        self.listing(key, || self.inner.search(query, page)).await
    }

    async fn anime(&self, id: &str) -> Result<Option<Anime>, AnirouteError> {
        if let Some(hit) = self.details.get(id).await {
            return Ok(Some(hit));
        }
        let found = self.inner.anime(id).await?;
        if let Some(anime) = &found {
            self.details.insert(id.to_string(), anime.clone()).await;
        }
        Ok(found)
    }

    async fn episodes(&self, anime_id: &str) -> Result<Vec<Episode>, AnirouteError> {
        if let Some(hit) = self.episodes.get(anime_id).await {
            return Ok(hit);
        }
        let list = self.inner.episodes(anime_id).await?;
        if !list.is_empty() {
            self.episodes.insert(anime_id.to_string(), list.clone()).await;
        }
        Ok(list)
    }

    async fn trending(&self, page: u32) -> Result<AnimePage, AnirouteError> {
        self.listing(ListingKey::Trending(page), || self.inner.trending(page))
            .await
    }

    async fn latest(&self, page: u32) -> Result<AnimePage, AnirouteError> {
        self.listing(ListingKey::Latest(page), || self.inner.latest(page))
            .await
    }

    async fn top_rated(&self, page: u32, limit: u32) -> Result<AnimePage, AnirouteError> {
        self.listing(ListingKey::TopRated { page, limit }, || {
            self.inner.top_rated(page, limit)
        })
        .await
    }

    async fn health_check(&self) -> Result<bool, AnirouteError> {
        self.inner.health_check().await
    }

    aniroute_core::aniroute_source_accessors!(inner);
}

#[async_trait]
impl GenreProvider for CachingSource {
    async fn by_genre(&self, genre: &str, page: u32) -> Result<AnimePage, AnirouteError> {
        let inner = self
            .inner
            .as_genre_provider()
            .ok_or_else(|| AnirouteError::unsupported("genre"))?;
        let key = ListingKey::Genre {
            genre: genre.to_lowercase(),
            page,
        };
        self.listing(key, || inner.by_genre(genre, page)).await
    }
}

#[async_trait]
impl EpisodeServersProvider for CachingSource {
    async fn episode_servers(&self, episode_id: &str) -> Result<EpisodeServers, AnirouteError> {
        self.inner
            .as_episode_servers_provider()
            .ok_or_else(|| AnirouteError::unsupported("episode-servers"))?
            .episode_servers(episode_id)
            .await
    }
}

#[async_trait]
impl StreamingLinksProvider for CachingSource {
    async fn streaming_links(
        &self,
        episode_id: &str,
        server: Option<&str>,
        category: Option<ServerCategory>,
    ) -> Result<StreamingLinks, AnirouteError> {
        self.inner
            .as_streaming_links_provider()
            .ok_or_else(|| AnirouteError::unsupported("streaming-links"))?
            .streaming_links(episode_id, server, category)
            .await
    }
}
