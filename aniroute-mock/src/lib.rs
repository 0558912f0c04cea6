use std::time::Duration;

use async_trait::async_trait;
use aniroute_core::connector::{
    AnimeSource, CatalogProvider, EpisodeServersProvider, GenreProvider, StreamingLinksProvider,
};
use aniroute_core::matching::token_set;
use aniroute_core::{
    AnirouteError, Anime, AnimePage, CatalogEntry, Episode, EpisodeServers, ServerCategory,
    StreamingLinks,
};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockSource, MockBehavior, Op};

/// Results per page for fixture listings other than top-rated.
pub const PAGE_SIZE: usize = 6;

/// Mock source for CI-safe examples. Provides deterministic data from static fixtures.
///
/// Queries and ids containing `FAIL` produce a provider error; `SLOW` adds
/// 200 ms of latency before answering.
pub struct MockSource {
    name: &'static str,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: "aniroute-mock",
        }
    }

    /// A fixture source registered under a different name.
    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self { name }
    }

    async fn maybe_fail_or_delay(&self, input: &str, capability: &str) -> Result<(), AnirouteError> {
        if input.contains("FAIL") {
            return Err(AnirouteError::provider(
                self.name,
                format!("forced failure: {capability}"),
            ));
        }
        if input.contains("SLOW") {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
        Ok(())
    }

    fn paginate(&self, items: Vec<Anime>, page: u32, per_page: usize) -> AnimePage {
        let per_page = per_page.max(1);
        let total = items.len();
        let total_pages = u32::try_from(total.div_ceil(per_page)).unwrap_or(u32::MAX);
        let start = (page.max(1) as usize - 1).saturating_mul(per_page);
        let results: Vec<Anime> = items.into_iter().skip(start).take(per_page).collect();
        AnimePage {
            results,
            current_page: page,
            total_pages,
            has_next_page: page < total_pages,
            source: self.name.to_string(),
        }
    }
}

#[async_trait]
impl AnimeSource for MockSource {
    fn name(&self) -> &'static str {
        self.name
    }
    fn vendor(&self) -> &'static str {
        "Mock"
    }

    async fn search(&self, query: &str, page: u32) -> Result<AnimePage, AnirouteError> {
        self.maybe_fail_or_delay(query, "search").await?;
        let wanted = token_set(query);
        let hits: Vec<Anime> = fixtures::catalog::all(self.name)
            .into_iter()
            .filter(|a| {
                let mut tokens = token_set(&a.title);
                if let Some(alt) = &a.alt_title {
                    tokens.extend(token_set(alt));
                }
                !wanted.is_empty() && wanted.iter().all(|w| tokens.contains(w))
            })
            .collect();
        Ok(self.paginate(hits, page, PAGE_SIZE))
    }

    async fn anime(&self, id: &str) -> Result<Option<Anime>, AnirouteError> {
        self.maybe_fail_or_delay(id, "anime").await?;
        Ok(fixtures::catalog::all(self.name)
            .into_iter()
            .find(|a| a.id == id))
    }

    async fn episodes(&self, anime_id: &str) -> Result<Vec<Episode>, AnirouteError> {
        self.maybe_fail_or_delay(anime_id, "episodes").await?;
        let Some(anime) = self.anime(anime_id).await? else {
            return Ok(Vec::new());
        };
        let count = anime.episodes.total().min(50);
        Ok((1..=count)
            .map(|n| Episode {
                id: format!("{anime_id}?ep={n}"),
                number: n,
                title: Some(format!("Episode {n}")),
                is_filler: false,
                has_sub: n <= anime.episodes.sub,
                has_dub: n <= anime.episodes.dub,
            })
            .collect())
    }

    async fn trending(&self, page: u32) -> Result<AnimePage, AnirouteError> {
        Ok(self.paginate(fixtures::catalog::all(self.name), page, PAGE_SIZE))
    }

    async fn latest(&self, page: u32) -> Result<AnimePage, AnirouteError> {
        let mut items = fixtures::catalog::all(self.name);
        items.sort_by(|a, b| b.year.cmp(&a.year));
        Ok(self.paginate(items, page, PAGE_SIZE))
    }

    async fn top_rated(&self, page: u32, limit: u32) -> Result<AnimePage, AnirouteError> {
        let mut items = fixtures::catalog::all(self.name);
        items.sort_by(|a, b| b.rating.unwrap_or(0.0).total_cmp(&a.rating.unwrap_or(0.0)));
        Ok(self.paginate(items, page, limit as usize))
    }

    async fn health_check(&self) -> Result<bool, AnirouteError> {
        Ok(true)
    }

    fn as_streaming_links_provider(&self) -> Option<&dyn StreamingLinksProvider> {
        Some(self as &dyn StreamingLinksProvider)
    }
    fn as_episode_servers_provider(&self) -> Option<&dyn EpisodeServersProvider> {
        Some(self as &dyn EpisodeServersProvider)
    }
    fn as_genre_provider(&self) -> Option<&dyn GenreProvider> {
        Some(self as &dyn GenreProvider)
    }
}

#[async_trait]
impl GenreProvider for MockSource {
    async fn by_genre(&self, genre: &str, page: u32) -> Result<AnimePage, AnirouteError> {
        self.maybe_fail_or_delay(genre, "genre").await?;
        let hits: Vec<Anime> = fixtures::catalog::all(self.name)
            .into_iter()
            .filter(|a| a.has_genre(genre))
            .collect();
        Ok(self.paginate(hits, page, PAGE_SIZE))
    }
}

#[async_trait]
impl EpisodeServersProvider for MockSource {
    async fn episode_servers(&self, episode_id: &str) -> Result<EpisodeServers, AnirouteError> {
        self.maybe_fail_or_delay(episode_id, "episode-servers").await?;
        Ok(fixtures::streaming::servers(episode_id, self.name))
    }
}

#[async_trait]
impl StreamingLinksProvider for MockSource {
    async fn streaming_links(
        &self,
        episode_id: &str,
        server: Option<&str>,
        category: Option<ServerCategory>,
    ) -> Result<StreamingLinks, AnirouteError> {
        self.maybe_fail_or_delay(episode_id, "streaming-links").await?;
        Ok(fixtures::streaming::links(episode_id, server, category, self.name))
    }
}

/// Metadata catalog backed by the same fixtures, with year-decorated titles.
pub struct MockCatalog;

#[async_trait]
impl CatalogProvider for MockCatalog {
    fn name(&self) -> &'static str {
        "aniroute-mock-catalog"
    }

    async fn by_genres(
        &self,
        genres: &[String],
        page: u32,
    ) -> Result<Vec<CatalogEntry>, AnirouteError> {
        let hits: Vec<CatalogEntry> = fixtures::catalog::catalog_entries()
            .into_iter()
            .filter(|e| {
                genres
                    .iter()
                    .all(|g| e.genres.iter().any(|eg| eg.eq_ignore_ascii_case(g)))
            })
            .collect();
        let start = (page.max(1) as usize - 1) * PAGE_SIZE;
        Ok(hits.into_iter().skip(start).take(PAGE_SIZE).collect())
    }
}
