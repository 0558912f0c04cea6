use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use aniroute_core::connector::{
    AnimeSource, EpisodeServersProvider, GenreProvider, StreamingLinksProvider,
};
use aniroute_core::{
    AnirouteError, Anime, AnimePage, Episode, EpisodeServers, ServerCategory, StreamingLinks,
};

/// Operations the dynamic mock can be scripted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `search`
    Search,
    /// `anime`
    Anime,
    /// `episodes`
    Episodes,
    /// `trending`
    Trending,
    /// `latest`
    Latest,
    /// `top_rated`
    TopRated,
    /// `by_genre`
    Genre,
    /// `episode_servers`
    EpisodeServers,
    /// `streaming_links`
    StreamingLinks,
    /// `health_check`
    HealthCheck,
}

/// Instruction for how a method should behave.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Return the provided value after sleeping.
    Delay(Duration, T),
    /// Fail immediately with the provided error.
    Fail(AnirouteError),
    /// Hang indefinitely (simulate a stalled upstream).
    Hang,
}

#[derive(Default)]
struct InternalState {
    search: Option<MockBehavior<AnimePage>>,
    anime: Option<MockBehavior<Option<Anime>>>,
    episodes: Option<MockBehavior<Vec<Episode>>>,
    trending: Option<MockBehavior<AnimePage>>,
    latest: Option<MockBehavior<AnimePage>>,
    top_rated: Option<MockBehavior<AnimePage>>,
    genre: Option<MockBehavior<AnimePage>>,
    servers: Option<MockBehavior<EpisodeServers>>,
    links: Option<MockBehavior<StreamingLinks>>,
    health: Option<MockBehavior<bool>>,
    // One-shot failures consumed before the persistent rule applies.
    pending_failures: HashMap<Op, Vec<AnirouteError>>,
    calls: HashMap<Op, u32>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
#[derive(Clone)]
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior of `search`.
    pub async fn set_search(&self, behavior: MockBehavior<AnimePage>) {
        self.state.lock().await.search = Some(behavior);
    }
    /// Set the behavior of `anime`.
    pub async fn set_anime(&self, behavior: MockBehavior<Option<Anime>>) {
        self.state.lock().await.anime = Some(behavior);
    }
    /// Set the behavior of `episodes`.
    pub async fn set_episodes(&self, behavior: MockBehavior<Vec<Episode>>) {
        self.state.lock().await.episodes = Some(behavior);
    }
    /// Set the behavior of `trending`.
    pub async fn set_trending(&self, behavior: MockBehavior<AnimePage>) {
        self.state.lock().await.trending = Some(behavior);
    }
    /// Set the behavior of `latest`.
    pub async fn set_latest(&self, behavior: MockBehavior<AnimePage>) {
        self.state.lock().await.latest = Some(behavior);
    }
    /// Set the behavior of `top_rated`.
    pub async fn set_top_rated(&self, behavior: MockBehavior<AnimePage>) {
        self.state.lock().await.top_rated = Some(behavior);
    }
    /// Set the behavior of `by_genre`.
    pub async fn set_genre(&self, behavior: MockBehavior<AnimePage>) {
        self.state.lock().await.genre = Some(behavior);
    }
    /// Set the behavior of `episode_servers`.
    pub async fn set_servers(&self, behavior: MockBehavior<EpisodeServers>) {
        self.state.lock().await.servers = Some(behavior);
    }
    /// Set the behavior of `streaming_links`.
    pub async fn set_links(&self, behavior: MockBehavior<StreamingLinks>) {
        self.state.lock().await.links = Some(behavior);
    }
    /// Set the behavior of `health_check`.
    pub async fn set_health(&self, behavior: MockBehavior<bool>) {
        self.state.lock().await.health = Some(behavior);
    }

    /// Make the next `times` calls of `op` fail with `err` before the
    /// configured behavior applies again.
    pub async fn fail_next(&self, op: Op, times: usize, err: AnirouteError) {
        let mut guard = self.state.lock().await;
        guard
            .pending_failures
            .entry(op)
            .or_default()
            .extend(std::iter::repeat_n(err, times));
    }

    /// Number of calls made to `op` so far.
    pub async fn calls(&self, op: Op) -> u32 {
        self.state.lock().await.calls.get(&op).copied().unwrap_or(0)
    }

    /// Clear all configured behaviors and call counters.
    pub async fn clear_all_behaviors(&self) {
        *self.state.lock().await = InternalState::default();
    }
}

/// A source that defers all behavior to an external controller.
///
/// Unscripted operations return empty results and a healthy probe.
pub struct DynamicMockSource {
    name: &'static str,
    genre: bool,
    streaming: bool,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockSource {
    /// Create a new dynamic mock source advertising every optional capability.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn AnimeSource>, DynamicMockController) {
        Self::with_capabilities(name, true, true)
    }

    /// Create a dynamic mock source that advertises genre listing only when
    /// `genre` is set and episode servers/streaming links only when
    /// `streaming` is set.
    #[must_use]
    pub fn with_capabilities(
        name: &'static str,
        genre: bool,
        streaming: bool,
    ) -> (Arc<dyn AnimeSource>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self {
            name,
            genre,
            streaming,
            state,
        });
        (me as Arc<dyn AnimeSource>, controller)
    }

    async fn run<T, S>(&self, op: Op, select: S, fallback: T) -> Result<T, AnirouteError>
    where
        T: Clone + Send,
        S: FnOnce(&InternalState) -> Option<MockBehavior<T>> + Send,
    {
        // Snapshot the behavior without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            *guard.calls.entry(op).or_insert(0) += 1;
            if let Some(queue) = guard.pending_failures.get_mut(&op)
                && !queue.is_empty()
            {
                return Err(queue.remove(0));
            }
            select(&*guard)
        };

        match behavior {
            Some(MockBehavior::Return(v)) => Ok(v),
            Some(MockBehavior::Delay(d, v)) => {
                tokio::time::sleep(d).await;
                Ok(v)
            }
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Ok(fallback),
        }
    }
}

#[async_trait]
impl AnimeSource for DynamicMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "DynamicMock"
    }

    async fn search(&self, _query: &str, page: u32) -> Result<AnimePage, AnirouteError> {
        self.run(Op::Search, |s| s.search.clone(), AnimePage::empty(page, self.name))
            .await
    }

    async fn anime(&self, _id: &str) -> Result<Option<Anime>, AnirouteError> {
        self.run(Op::Anime, |s| s.anime.clone(), None).await
    }

    async fn episodes(&self, _anime_id: &str) -> Result<Vec<Episode>, AnirouteError> {
        self.run(Op::Episodes, |s| s.episodes.clone(), Vec::new())
            .await
    }

    async fn trending(&self, page: u32) -> Result<AnimePage, AnirouteError> {
        self.run(Op::Trending, |s| s.trending.clone(), AnimePage::empty(page, self.name))
            .await
    }

    async fn latest(&self, page: u32) -> Result<AnimePage, AnirouteError> {
        self.run(Op::Latest, |s| s.latest.clone(), AnimePage::empty(page, self.name))
            .await
    }

    async fn top_rated(&self, page: u32, _limit: u32) -> Result<AnimePage, AnirouteError> {
        self.run(Op::TopRated, |s| s.top_rated.clone(), AnimePage::empty(page, self.name))
            .await
    }

    async fn health_check(&self) -> Result<bool, AnirouteError> {
        self.run(Op::HealthCheck, |s| s.health.clone(), true).await
    }

    fn as_streaming_links_provider(&self) -> Option<&dyn StreamingLinksProvider> {
        self.streaming.then_some(self as &dyn StreamingLinksProvider)
    }
    fn as_episode_servers_provider(&self) -> Option<&dyn EpisodeServersProvider> {
        self.streaming.then_some(self as &dyn EpisodeServersProvider)
    }
    fn as_genre_provider(&self) -> Option<&dyn GenreProvider> {
        self.genre.then_some(self as &dyn GenreProvider)
    }
}

#[async_trait]
impl GenreProvider for DynamicMockSource {
    async fn by_genre(&self, _genre: &str, page: u32) -> Result<AnimePage, AnirouteError> {
        self.run(Op::Genre, |s| s.genre.clone(), AnimePage::empty(page, self.name))
            .await
    }
}

#[async_trait]
impl EpisodeServersProvider for DynamicMockSource {
    async fn episode_servers(&self, episode_id: &str) -> Result<EpisodeServers, AnirouteError> {
        self.run(
            Op::EpisodeServers,
            |s| s.servers.clone(),
            EpisodeServers::default_for(episode_id),
        )
        .await
    }
}

#[async_trait]
impl StreamingLinksProvider for DynamicMockSource {
    async fn streaming_links(
        &self,
        _episode_id: &str,
        _server: Option<&str>,
        _category: Option<ServerCategory>,
    ) -> Result<StreamingLinks, AnirouteError> {
        self.run(Op::StreamingLinks, |s| s.links.clone(), StreamingLinks::default())
            .await
    }
}
