use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use aniroute_core::{
    AnimeSource, AnirouteError, Capability, EpisodeServers, RequestContext, ServerCategory,
    SourceCapabilities, StreamingLinks,
};

use crate::SourceManager;
use crate::router::util::settle;

impl SourceManager {
    /// Scan every available source advertising the operation's optional
    /// capability, route target first and then in priority order, until one
    /// returns a non-empty result. Errors and empty results move on to the
    /// next source; they do not mark the source unavailable.
    async fn scan<T, E, F, Fut>(
        &self,
        ctx: &RequestContext,
        prefer: &[&str],
        is_empty: E,
        call: F,
    ) -> Result<Option<T>, AnirouteError>
    where
        E: Fn(&T) -> bool,
        F: Fn(Arc<dyn AnimeSource>) -> Fut,
        Fut: Future<Output = Result<T, AnirouteError>>,
    {
        let required = SourceCapabilities::required_for(ctx.operation());
        let mut visited: HashSet<&'static str> = HashSet::new();
        let mut errors = Vec::new();

        while let Some(selected) = self.pick(prefer, &visited, required) {
            if ctx.is_cancelled() {
                return Err(ctx.cancelled_error());
            }
            let name = selected.name();
            visited.insert(name);
            let adapter = Arc::clone(selected.source());
            match self
                .invoker
                .invoke(ctx, name, |_| call(Arc::clone(&adapter)))
                .await
            {
                Ok(v) if !is_empty(&v) => return Ok(Some(v)),
                Ok(_) => tracing::debug!(
                    target: "aniroute::router",
                    source = name,
                    operation = %ctx.operation(),
                    correlation_id = ctx.correlation_id(),
                    "empty result; scanning on"
                ),
                Err(e) if e.is_cancellation() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        target: "aniroute::router",
                        source = name,
                        operation = %ctx.operation(),
                        correlation_id = ctx.correlation_id(),
                        error = %e,
                        "failover"
                    );
                    errors.push(crate::tag_err(name, e));
                }
            }
        }

        if visited.is_empty() {
            return Err(AnirouteError::NoSourceAvailable {
                capability: ctx.operation().to_string(),
            });
        }
        if errors.is_empty() {
            Ok(None)
        } else {
            Err(crate::router::util::collapse_errors(ctx.operation(), errors))
        }
    }

    /// Streaming servers for an episode, from the first source that lists any.
    ///
    /// Returns [`EpisodeServers::fallback`] over the configured fallback
    /// servers (empty by default) when no source could serve one.
    #[tracing::instrument(target = "aniroute::router", skip(self))]
    pub async fn get_episode_servers(&self, episode_id: &str) -> EpisodeServers {
        let ctx = self.context(Capability::EpisodeServers);
        let prefer: Vec<&str> = self.route_for(episode_id).into_iter().collect();
        let outcome = self
            .scan(&ctx, &prefer, EpisodeServers::is_empty, |s| async move {
                match s.as_episode_servers_provider() {
                    Some(p) => p.episode_servers(episode_id).await,
                    None => Err(AnirouteError::unsupported(
                        Capability::EpisodeServers.as_str(),
                    )),
                }
            })
            .await;
        settle(&ctx, outcome, || None)
            .unwrap_or_else(|| EpisodeServers::fallback(episode_id, &self.cfg.fallback_servers))
    }

    /// Playable links for an episode, from the first source that resolves any.
    ///
    /// `server` and `category` are forwarded to each source as given.
    #[tracing::instrument(target = "aniroute::router", skip(self))]
    pub async fn get_streaming_links(
        &self,
        episode_id: &str,
        server: Option<&str>,
        category: Option<ServerCategory>,
    ) -> StreamingLinks {
        let ctx = self.context(Capability::StreamingLinks);
        let prefer: Vec<&str> = self.route_for(episode_id).into_iter().collect();
        let outcome = self
            .scan(&ctx, &prefer, StreamingLinks::is_empty, |s| async move {
                match s.as_streaming_links_provider() {
                    Some(p) => p.streaming_links(episode_id, server, category).await,
                    None => Err(AnirouteError::unsupported(
                        Capability::StreamingLinks.as_str(),
                    )),
                }
            })
            .await;
        settle(&ctx, outcome, || None).unwrap_or_default()
    }
}
