use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use aniroute_core::{
    AnimeSource, AnirouteConfig, AnirouteError, BrowseConfig, Capability, CatalogProvider,
    CircuitBreakerConfig, EnrichmentConfig, EpisodeServer, HealthConfig, RequestContext,
    ResilienceReport, RetryConfig, SourceCapabilities, SourceKey, SourceStatus, scoped_token,
};
use aniroute_middleware::ReliableInvoker;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::health::{HealthMonitor, HealthSnapshot};
use crate::registry::{RegisteredSource, SourceRegistry};
use crate::router::genre::LookupCache;
use crate::routing::{IdRoutingTable, RouteRule};

/// A logical request touches at most this many sources: the selected one and
/// a single failover target.
pub(crate) const MAX_SOURCES_PER_REQUEST: usize = 2;

/// Orchestrator that routes requests across registered sources.
pub struct SourceManager {
    pub(crate) registry: Arc<SourceRegistry>,
    pub(crate) routes: IdRoutingTable,
    pub(crate) invoker: ReliableInvoker,
    pub(crate) health: Arc<HealthMonitor>,
    pub(crate) catalog: Option<Arc<dyn CatalogProvider>>,
    pub(crate) lookup: LookupCache,
    pub(crate) cfg: AnirouteConfig,
    correlation: AtomicU64,
    root: CancellationToken,
}

impl std::fmt::Debug for SourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceManager")
            .field("registry", &self.registry)
            .field("routes", &self.routes)
            .field("catalog", &self.catalog.as_ref().map(|c| c.name()))
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

/// Whether a failed call removes the source from routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Demotion {
    OnError,
    Never,
}

/// Builder for constructing a `SourceManager` with custom configuration.
pub struct SourceManagerBuilder {
    sources: Vec<Arc<dyn AnimeSource>>,
    priority: Vec<SourceKey>,
    routes: Vec<RouteRule>,
    catalog: Option<Arc<dyn CatalogProvider>>,
    cfg: AnirouteConfig,
}

impl Default for SourceManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceManagerBuilder {
    /// Create a new builder with default resilience settings and no sources.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: vec![],
            priority: vec![],
            routes: vec![],
            catalog: None,
            cfg: AnirouteConfig::default(),
        }
    }

    /// Register a source.
    ///
    /// Registration order is the last-resort selection order and the default
    /// priority order for sources not named in [`priority`](Self::priority).
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn AnimeSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Set the initial priority order. Sources not listed follow in
    /// registration order; unknown and repeated keys are dropped at build time.
    #[must_use]
    pub fn priority(mut self, keys: &[SourceKey]) -> Self {
        self.priority = keys.to_vec();
        self
    }

    /// Route identifiers starting with `prefix` to `primary`, falling back to
    /// `backup` when the primary is unavailable.
    #[must_use]
    pub fn route_prefix(
        mut self,
        prefix: impl Into<String>,
        primary: SourceKey,
        backup: Option<SourceKey>,
    ) -> Self {
        self.routes.push(RouteRule {
            prefix: prefix.into(),
            primary,
            backup,
        });
        self
    }

    /// Attach a metadata catalog used for genre enrichment and multi-genre browsing.
    #[must_use]
    pub fn catalog(mut self, catalog: Arc<dyn CatalogProvider>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: AnirouteConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Retry policy for every outbound call.
    #[must_use]
    pub const fn retry(mut self, retry: RetryConfig) -> Self {
        self.cfg.retry = retry;
        self
    }

    /// Deadline for a single attempt.
    #[must_use]
    pub const fn call_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.cfg.call_timeout = timeout;
        self
    }

    /// Calls slower than this are logged as slow.
    #[must_use]
    pub const fn slow_call_threshold(mut self, threshold: std::time::Duration) -> Self {
        self.cfg.slow_call_threshold = threshold;
        self
    }

    /// Per-source breaker settings.
    #[must_use]
    pub const fn circuit_breaker(mut self, cfg: CircuitBreakerConfig) -> Self {
        self.cfg.circuit_breaker = cfg;
        self
    }

    /// Health probing settings.
    #[must_use]
    pub const fn health(mut self, cfg: HealthConfig) -> Self {
        self.cfg.health = cfg;
        self
    }

    /// Global ceiling of in-flight outbound calls.
    #[must_use]
    pub const fn max_in_flight(mut self, n: usize) -> Self {
        self.cfg.max_in_flight = n;
        self
    }

    /// Result count at which `search_all` stops querying further sources.
    #[must_use]
    pub const fn search_all_threshold(mut self, n: usize) -> Self {
        self.cfg.search_all_threshold = n;
        self
    }

    /// Genre enrichment settings.
    #[must_use]
    pub fn enrichment(mut self, cfg: EnrichmentConfig) -> Self {
        self.cfg.enrichment = cfg;
        self
    }

    /// Browse and random-pick settings.
    #[must_use]
    pub const fn browse(mut self, cfg: BrowseConfig) -> Self {
        self.cfg.browse = cfg;
        self
    }

    /// Servers returned by `get_episode_servers` when every source fails.
    #[must_use]
    pub fn fallback_servers(mut self, servers: Vec<EpisodeServer>) -> Self {
        self.cfg.fallback_servers = servers;
        self
    }

    /// Build the `SourceManager`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no source is registered, two sources share a
    /// name, a route names an unregistered source, or the retry policy allows
    /// zero attempts.
    pub fn build(self) -> Result<SourceManager, AnirouteError> {
        if self.sources.is_empty() {
            return Err(AnirouteError::InvalidArg(
                "no sources registered; add at least one via with_source(...)".to_string(),
            ));
        }
        let mut known: HashSet<&'static str> = HashSet::new();
        for s in &self.sources {
            if !known.insert(s.name()) {
                return Err(AnirouteError::InvalidArg(format!(
                    "duplicate source name: {}",
                    s.name()
                )));
            }
        }
        if self.cfg.retry.max_attempts == 0 {
            return Err(AnirouteError::InvalidArg(
                "retry.max_attempts must be >= 1".to_string(),
            ));
        }

        let mut routes = IdRoutingTable::default();
        for rule in self.routes {
            for target in std::iter::once(rule.primary).chain(rule.backup) {
                if !known.contains(target.as_str()) {
                    return Err(AnirouteError::InvalidArg(format!(
                        "route '{}' targets unknown source: {}",
                        rule.prefix,
                        target.as_str()
                    )));
                }
            }
            routes.insert(rule);
        }

        let preferred: Vec<&'static str> = self.priority.iter().map(|k| k.as_str()).collect();
        let registry = Arc::new(SourceRegistry::new(self.sources, &preferred));
        let health = Arc::new(HealthMonitor::new(self.cfg.health, &registry));

        Ok(SourceManager {
            invoker: ReliableInvoker::new(&self.cfg),
            registry,
            routes,
            health,
            catalog: self.catalog,
            lookup: LookupCache::default(),
            cfg: self.cfg,
            correlation: AtomicU64::new(0),
            root: CancellationToken::new(),
        })
    }
}

/// Attribute an error to `provider` unless it already names its origin.
pub fn tag_err(provider: &str, e: AnirouteError) -> AnirouteError {
    match e {
        e @ (AnirouteError::NotFound { .. }
        | AnirouteError::ProviderTimeout { .. }
        | AnirouteError::Provider { .. }
        | AnirouteError::CircuitOpen { .. }
        | AnirouteError::Cancelled { .. }
        | AnirouteError::AllProvidersTimedOut { .. }
        | AnirouteError::AllProvidersFailed(_)) => e,
        other => AnirouteError::Provider {
            provider: provider.to_string(),
            msg: other.to_string(),
        },
    }
}

impl SourceManager {
    /// Start building a new `SourceManager`.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use aniroute::{SourceKey, SourceManager};
    ///
    /// let manager = SourceManager::builder()
    ///     .with_source(hianime.clone())
    ///     .with_source(gogo.clone())
    ///     .priority(&[SourceKey::new("gogo")])
    ///     .route_prefix("hi-", SourceKey::new("hianime"), Some(SourceKey::new("gogo")))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> SourceManagerBuilder {
        SourceManagerBuilder::new()
    }

    /// Effective configuration.
    #[must_use]
    pub const fn config(&self) -> &AnirouteConfig {
        &self.cfg
    }

    /// The source registry.
    #[must_use]
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Context for one façade call. The caller's `with_cancellation` scope, if
    /// any, wins over the manager's root token.
    pub(crate) fn context(&self, operation: Capability) -> RequestContext {
        let token = scoped_token().map_or_else(|| self.root.child_token(), |t| t.child_token());
        let id = self.correlation.fetch_add(1, Ordering::Relaxed) + 1;
        RequestContext::new(operation, id, token)
    }

    /// Preferred source for an identifier: the route's primary when usable,
    /// else its backup.
    pub(crate) fn route_for(&self, id: &str) -> Option<&'static str> {
        let rule = self.routes.resolve(id)?;
        let usable = |key: SourceKey| {
            self.registry
                .get(key.as_str())
                .filter(|s| s.is_available())
                .map(|s| s.name())
        };
        usable(rule.primary).or_else(|| rule.backup.and_then(usable))
    }

    /// First eligible source among `prefer`, else generic priority selection.
    pub(crate) fn pick(
        &self,
        prefer: &[&str],
        visited: &HashSet<&'static str>,
        required: SourceCapabilities,
    ) -> Option<Arc<RegisteredSource>> {
        prefer
            .iter()
            .find_map(|name| {
                self.registry
                    .select_excluding(Some(*name), visited, required)
                    .filter(|s| s.name() == *name)
            })
            .or_else(|| self.registry.select_excluding(None, visited, required))
    }

    /// Remove a source from routing after a failed call.
    pub(crate) fn demote(&self, ctx: &RequestContext, name: &str, err: &AnirouteError) {
        if matches!(err, AnirouteError::CircuitOpen { .. }) || err.is_cancellation() {
            return;
        }
        if self.registry.mark_unavailable(name) {
            tracing::warn!(
                target: "aniroute::router",
                source = name,
                operation = %ctx.operation(),
                correlation_id = ctx.correlation_id(),
                error = %err,
                "source marked unavailable"
            );
        }
    }

    /// Run `call` against the selected source and fail over once.
    ///
    /// - The first pick honors `prefer`, then the priority order.
    /// - An error or a result for which `is_empty` holds moves on to one
    ///   other source; a source is never called twice.
    /// - Errors mark the source unavailable until the next health cycle.
    /// - Cancellation returns immediately.
    ///
    /// When every attempt came back empty the last empty result is returned.
    pub(crate) async fn failover<T, E, F, Fut>(
        &self,
        ctx: &RequestContext,
        prefer: &[&str],
        is_empty: E,
        call: F,
    ) -> Result<T, AnirouteError>
    where
        E: Fn(&T) -> bool,
        F: Fn(Arc<dyn AnimeSource>) -> Fut,
        Fut: Future<Output = Result<T, AnirouteError>>,
    {
        self.failover_with(ctx, prefer, Demotion::OnError, is_empty, call)
            .await
    }

    /// [`failover`](Self::failover) for auxiliary fetches (browse prefetch,
    /// enrichment lookups): failures fall through to the next source but
    /// never change availability.
    pub(crate) async fn failover_quiet<T, E, F, Fut>(
        &self,
        ctx: &RequestContext,
        prefer: &[&str],
        is_empty: E,
        call: F,
    ) -> Result<T, AnirouteError>
    where
        E: Fn(&T) -> bool,
        F: Fn(Arc<dyn AnimeSource>) -> Fut,
        Fut: Future<Output = Result<T, AnirouteError>>,
    {
        self.failover_with(ctx, prefer, Demotion::Never, is_empty, call)
            .await
    }

    async fn failover_with<T, E, F, Fut>(
        &self,
        ctx: &RequestContext,
        prefer: &[&str],
        demotion: Demotion,
        is_empty: E,
        call: F,
    ) -> Result<T, AnirouteError>
    where
        E: Fn(&T) -> bool,
        F: Fn(Arc<dyn AnimeSource>) -> Fut,
        Fut: Future<Output = Result<T, AnirouteError>>,
    {
        let required = SourceCapabilities::required_for(ctx.operation());
        let mut visited: HashSet<&'static str> = HashSet::new();
        let mut errors: Vec<AnirouteError> = Vec::new();
        let mut empty: Option<T> = None;

        while visited.len() < MAX_SOURCES_PER_REQUEST {
            if ctx.is_cancelled() {
                return Err(ctx.cancelled_error());
            }
            let Some(selected) = self.pick(prefer, &visited, required) else {
                break;
            };
            let name = selected.name();
            visited.insert(name);
            tracing::debug!(
                target: "aniroute::router",
                source = name,
                operation = %ctx.operation(),
                correlation_id = ctx.correlation_id(),
                "request start"
            );

            let adapter = Arc::clone(selected.source());
            match self
                .invoker
                .invoke(ctx, name, |_| call(Arc::clone(&adapter)))
                .await
            {
                Ok(v) if !is_empty(&v) => {
                    tracing::debug!(
                        target: "aniroute::router",
                        source = name,
                        operation = %ctx.operation(),
                        correlation_id = ctx.correlation_id(),
                        elapsed_ms = crate::health::millis(ctx.elapsed()),
                        "response"
                    );
                    return Ok(v);
                }
                Ok(v) => {
                    tracing::debug!(
                        target: "aniroute::router",
                        source = name,
                        operation = %ctx.operation(),
                        correlation_id = ctx.correlation_id(),
                        "empty result; failing over"
                    );
                    empty = Some(v);
                }
                Err(e) if e.is_cancellation() => return Err(e),
                Err(e) => {
                    if demotion == Demotion::OnError {
                        self.demote(ctx, name, &e);
                    }
                    tracing::warn!(
                        target: "aniroute::router",
                        source = name,
                        operation = %ctx.operation(),
                        correlation_id = ctx.correlation_id(),
                        error = %e,
                        "failover"
                    );
                    errors.push(tag_err(name, e));
                }
            }
        }

        if let Some(v) = empty {
            return Ok(v);
        }
        if visited.is_empty() {
            return Err(AnirouteError::NoSourceAvailable {
                capability: ctx.operation().to_string(),
            });
        }
        Err(crate::router::util::collapse_errors(ctx.operation(), errors))
    }

    /// Run one health cycle now and return the published snapshot.
    pub async fn check_all_health(&self) -> HealthSnapshot {
        self.health.check_all(&self.registry).await
    }

    /// Latest published health snapshot.
    #[must_use]
    pub fn health_status(&self) -> HealthSnapshot {
        self.health.snapshot()
    }

    /// Move `name` to the front of the priority order.
    ///
    /// # Errors
    /// Returns `InvalidArg` when `name` is not registered.
    pub fn set_preferred_source(&self, name: &str) -> Result<(), AnirouteError> {
        self.registry.promote(name)?;
        tracing::info!(
            target: "aniroute::router",
            source = name,
            priority = ?self.registry.priority(),
            "preferred source changed"
        );
        Ok(())
    }

    /// Priority order, availability, health, and breaker state per source.
    #[must_use]
    pub fn resilience_report(&self) -> ResilienceReport {
        let health = self.health.snapshot();
        ResilienceReport {
            priority: self
                .registry
                .priority()
                .into_iter()
                .map(str::to_string)
                .collect(),
            sources: self
                .registry
                .sources()
                .iter()
                .map(|s| SourceStatus {
                    name: s.name().to_string(),
                    available: s.is_available(),
                    health: health.get(s.name()).cloned(),
                    circuit: self.invoker.circuit(s.name()),
                    capabilities: s
                        .capabilities()
                        .labels()
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                })
                .collect(),
            in_flight: self.invoker.in_flight(),
        }
    }

    /// Spawn the periodic health monitor: one cycle immediately, then one per
    /// configured interval until [`shutdown`](Self::shutdown).
    pub fn spawn_health_monitor(&self) -> JoinHandle<()> {
        let registry = Arc::clone(&self.registry);
        let health = Arc::clone(&self.health);
        let stop = self.root.child_token();
        let period = self.cfg.health.interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = stop.cancelled() => break,
                    _ = ticker.tick() => {
                        health.check_all(&registry).await;
                    }
                }
            }
            tracing::debug!(target: "aniroute::health", "health monitor stopped");
        })
    }

    /// Cancel every request running without its own cancellation scope and
    /// stop the health monitor.
    pub fn shutdown(&self) {
        self.root.cancel();
    }
}
