//! aniroute-http
//!
//! Source adapter that implements `AnimeSource` on top of a JSON REST backend.
//!
//! Endpoints, relative to the configured base URL:
//!
//! | operation          | request                                              |
//! |--------------------|------------------------------------------------------|
//! | search             | `GET search?q=<query>&page=<n>`                      |
//! | anime              | `GET anime/<id>` (404 → `None`)                      |
//! | episodes           | `GET anime/<id>/episodes`                            |
//! | trending / latest  | `GET trending?page=<n>`, `GET latest?page=<n>`       |
//! | top rated          | `GET top-rated?page=<n>&limit=<l>`                   |
//! | genre              | `GET genre/<genre>?page=<n>`                         |
//! | episode servers    | `GET episode/servers?id=<episode>`                   |
//! | streaming links    | `GET episode/sources?id=<episode>[&server=][&category=]` |
//! | health             | `GET health` (any 2xx is healthy)                    |
#![warn(missing_docs)]

mod wire;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use aniroute_core::connector::{
    AnimeSource, EpisodeServersProvider, GenreProvider, StreamingLinksProvider,
};
use aniroute_core::{
    AnirouteError, Anime, AnimePage, Episode, EpisodeServers, ServerCategory, StreamingLinks,
};

use crate::wire::{AnimeDto, EpisodeDto, LinksDto, PageDto, ServersDto};

/// A source backed by a JSON REST API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    name: &'static str,
    base: Url,
    http: reqwest::Client,
    genre: bool,
    streaming: bool,
}

/// Builder for [`HttpSource`].
#[derive(Debug)]
pub struct HttpSourceBuilder {
    name: &'static str,
    base_url: String,
    timeout: Option<Duration>,
    user_agent: String,
    client: Option<reqwest::Client>,
    genre: bool,
    streaming: bool,
}

impl HttpSourceBuilder {
    /// Per-request transport timeout. The orchestrator applies its own
    /// deadline on top of this.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Use a preconfigured client; `timeout` and `user_agent` are then ignored.
    #[must_use]
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Advertise genre listing (`genre/<genre>`).
    #[must_use]
    pub const fn with_genre(mut self, enabled: bool) -> Self {
        self.genre = enabled;
        self
    }

    /// Advertise episode servers and streaming links.
    #[must_use]
    pub const fn with_streaming(mut self, enabled: bool) -> Self {
        self.streaming = enabled;
        self
    }

    /// Validate the base URL and build the source.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the base URL does not parse or is not
    /// http(s), and `Other` when the HTTP client cannot be constructed.
    pub fn build(self) -> Result<HttpSource, AnirouteError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| AnirouteError::InvalidArg(format!("base url {}: {e}", self.base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(AnirouteError::InvalidArg(format!(
                "base url {} must be http(s)",
                self.base_url
            )));
        }
        if base.cannot_be_a_base() {
            return Err(AnirouteError::InvalidArg(format!(
                "base url {} cannot carry a path",
                self.base_url
            )));
        }

        let http = match self.client {
            Some(c) => c,
            None => {
                let mut b = reqwest::Client::builder().user_agent(self.user_agent);
                if let Some(t) = self.timeout {
                    b = b.timeout(t);
                }
                b.build()
                    .map_err(|e| AnirouteError::Other(format!("http client: {e}")))?
            }
        };

        Ok(HttpSource {
            name: self.name,
            base,
            http,
            genre: self.genre,
            streaming: self.streaming,
        })
    }
}

impl HttpSource {
    /// Start building a source registered as `name` against `base_url`.
    #[must_use]
    pub fn builder(name: &'static str, base_url: impl Into<String>) -> HttpSourceBuilder {
        HttpSourceBuilder {
            name,
            base_url: base_url.into(),
            timeout: None,
            user_agent: concat!("aniroute/", env!("CARGO_PKG_VERSION")).to_string(),
            client: None,
            genre: false,
            streaming: false,
        }
    }

    /// Append percent-encoded `segments` to the base path.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, AnirouteError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| AnirouteError::InvalidArg(format!("{} cannot carry a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, AnirouteError> {
        tracing::debug!(target: "aniroute::http", source = self.name, %url, "GET");
        let resp = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AnirouteError::provider(
                self.name,
                format!("status {}: {}", status.as_u16(), url.path()),
            ));
        }
        resp.json::<T>().await.map(Some).map_err(|e| {
            AnirouteError::Data(format!("{}: malformed payload from {}: {e}", self.name, url.path()))
        })
    }

    // Listing endpoints treat 404 as an empty page rather than an error.
    async fn page(
        &self,
        path: &[&str],
        query: &[(&str, String)],
        page: u32,
    ) -> Result<AnimePage, AnirouteError> {
        let url = self.endpoint(path, query)?;
        Ok(self
            .fetch::<PageDto>(url)
            .await?
            .map_or_else(|| AnimePage::empty(page, self.name), |dto| dto.into_page(self.name)))
    }

    fn transport_error(&self, e: &reqwest::Error) -> AnirouteError {
        let kind = if e.is_timeout() {
            "timeout"
        } else if e.is_connect() {
            "connect"
        } else {
            "transport"
        };
        AnirouteError::provider(self.name, format!("{kind}: {e}"))
    }
}

#[async_trait]
impl AnimeSource for HttpSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "http"
    }

    async fn search(&self, query: &str, page: u32) -> Result<AnimePage, AnirouteError> {
        self.page(
            &["search"],
            &[("q", query.to_string()), ("page", page.to_string())],
            page,
        )
        .await
    }

    async fn anime(&self, id: &str) -> Result<Option<Anime>, AnirouteError> {
        let url = self.endpoint(&["anime", id], &[])?;
        Ok(self
            .fetch::<AnimeDto>(url)
            .await?
            .map(|dto| dto.into_anime(self.name)))
    }

    async fn episodes(&self, anime_id: &str) -> Result<Vec<Episode>, AnirouteError> {
        let url = self.endpoint(&["anime", anime_id, "episodes"], &[])?;
        Ok(self
            .fetch::<Vec<EpisodeDto>>(url)
            .await?
            .unwrap_or_default()
            .into_iter()
            .map(Episode::from)
            .collect())
    }

    async fn trending(&self, page: u32) -> Result<AnimePage, AnirouteError> {
        self.page(&["trending"], &[("page", page.to_string())], page)
            .await
    }

    async fn latest(&self, page: u32) -> Result<AnimePage, AnirouteError> {
        self.page(&["latest"], &[("page", page.to_string())], page).await
    }

    async fn top_rated(&self, page: u32, limit: u32) -> Result<AnimePage, AnirouteError> {
        self.page(
            &["top-rated"],
            &[("page", page.to_string()), ("limit", limit.to_string())],
            page,
        )
        .await
    }

    async fn health_check(&self) -> Result<bool, AnirouteError> {
        let url = self.endpoint(&["health"], &[])?;
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;
        Ok(resp.status().is_success())
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
impl GenreProvider for HttpSource {
    async fn by_genre(&self, genre: &str, page: u32) -> Result<AnimePage, AnirouteError> {
        let genre = genre.to_lowercase();
        self.page(&["genre", genre.as_str()], &[("page", page.to_string())], page)
            .await
    }
}

#[async_trait]
impl EpisodeServersProvider for HttpSource {
    async fn episode_servers(&self, episode_id: &str) -> Result<EpisodeServers, AnirouteError> {
        let url = self.endpoint(&["episode", "servers"], &[("id", episode_id.to_string())])?;
        Ok(self
            .fetch::<ServersDto>(url)
            .await?
            .unwrap_or_default()
            .into_servers(episode_id, self.name))
    }
}

#[async_trait]
impl StreamingLinksProvider for HttpSource {
    async fn streaming_links(
        &self,
        episode_id: &str,
        server: Option<&str>,
        category: Option<ServerCategory>,
    ) -> Result<StreamingLinks, AnirouteError> {
        let mut query = vec![("id", episode_id.to_string())];
        if let Some(s) = server {
            query.push(("server", s.to_string()));
        }
        if let Some(c) = category {
            query.push(("category", c.as_str().to_string()));
        }
        let url = self.endpoint(&["episode", "sources"], &query)?;
        Ok(self
            .fetch::<LinksDto>(url)
            .await?
            .unwrap_or_default()
            .into_links(self.name))
    }
}
