//! aniroute orchestrates content requests across multiple unreliable anime sources.
//!
//! Overview
//! - Routes every request to one registered source implementing the
//!   `aniroute_core` contracts, chosen by explicit preference, identifier
//!   prefix, or the mutable priority order.
//! - Wraps each outbound call in retry with exponential backoff, a per-source
//!   circuit breaker, a global admission gate, and a per-attempt deadline.
//! - Fails over exactly once per logical request on error or empty result;
//!   episode servers and streaming links scan every capable source instead.
//! - Never returns errors from content operations: exhaustion yields an empty
//!   page, `None`, or an empty list, and the attempt chain is logged.
//!
//! Key behaviors and trade-offs
//! - `search_all` queries sources sequentially to bound load and stops once the
//!   configured threshold of results is reached.
//! - Single-genre listings with a catalog attached resolve catalog entries via a
//!   cached title table (fast, may miss) with live fuzzy search as a fallback;
//!   multi-genre browsing uses live fuzzy search only.
//! - Availability flags are cleared immediately after a failed call and only
//!   restored by the next health cycle.
//! - Breaker transitions are evaluated lazily on access; an idle breaker does
//!   not visibly reset until the next call.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use aniroute::{SourceKey, SourceManager, with_cancellation, CancellationToken};
//!
//! let manager = SourceManager::builder()
//!     .with_source(Arc::new(hianime))
//!     .with_source(Arc::new(gogo))
//!     .priority(&[SourceKey::new("hianime")])
//!     .route_prefix("gogo-", SourceKey::new("gogo"), Some(SourceKey::new("hianime")))
//!     .build()?;
//! let monitor = manager.spawn_health_monitor();
//!
//! let page = manager.search("frieren", 1, None).await;
//! let report = manager.search_all("naruto", 1).await;
//! println!("{} results from {}", report.page.results.len(), report.page.source);
//!
//! let token = CancellationToken::new();
//! let links = with_cancellation(token.clone(), manager.get_streaming_links("ep-1", None, None)).await;
//! manager.shutdown();
//! ```
//!
//! See `aniroute/examples/` for a runnable demonstration.
#![warn(missing_docs)]

pub(crate) mod core;
mod health;
mod registry;
mod router;
mod routing;

pub use crate::core::{SourceManager, SourceManagerBuilder, tag_err};
pub use health::{HealthMonitor, HealthSnapshot};
pub use registry::{RegisteredSource, SourceRegistry};
pub use router::util::collapse_errors;
pub use routing::{IdRoutingTable, RouteRule};

pub use aniroute_middleware::{CacheMiddleware, ReliableInvoker, SourceBuilder};

// Re-export core types for convenience
pub use aniroute_core::{
    AiringStatus, Anime, AnimePage, AnimeSource, AnirouteConfig, AnirouteError, BrowseConfig,
    BrowsePage, BrowseRequest, BrowseRequestBuilder, CacheConfig, CancellationToken, Capability,
    CatalogEntry, CatalogProvider, CircuitBreakerConfig, CircuitSnapshot, CircuitState,
    EnrichmentConfig, Episode, EpisodeCounts, EpisodeServer, EpisodeServers,
    EpisodeServersProvider, GenreProvider, HealthConfig, HealthState, MediaFormat,
    ResilienceReport, RetryConfig, SearchAllReport, ServerCategory, SortKey, SortOrder,
    SourceCapabilities, SourceFailure, SourceHealth, SourceKey, SourceStatus, StreamingLinks,
    StreamingLinksProvider, Subtitle, VideoSource, with_cancellation,
};
