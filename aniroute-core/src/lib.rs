//! aniroute-core
//!
//! Core types, traits, and utilities shared across the aniroute workspace.
//!
//! - `types`: re-exported content records, configuration, and the error type.
//! - `connector`: the `AnimeSource` trait and optional capability traits.
//! - `capabilities`: capability flags resolved once per registered source.
//! - `context`: per-request context and the task-local cancellation scope.
//! - `matching`: title normalization, lookup tables, and fuzzy matching.
//!
//! Async runtime (Tokio)
//! ---------------------
//! The cancellation scope uses `tokio::task_local!` and
//! `tokio_util::sync::CancellationToken`, so code that calls into the
//! orchestrator must run under a Tokio 1.x runtime.
//!
#![warn(missing_docs)]

/// Capability flags for registered sources.
pub mod capabilities;
/// Source capability traits and the primary `AnimeSource` interface.
pub mod connector;
/// Request context and cancellation scope.
pub mod context;
pub mod matching;
/// Middleware trait implemented by source wrappers.
pub mod middleware;
pub mod types;

pub use capabilities::SourceCapabilities;
pub use connector::{
    AnimeSource, CatalogProvider, EpisodeServersProvider, GenreProvider, StreamingLinksProvider,
};
pub use context::{RequestContext, scoped_token, with_cancellation};
pub use middleware::Middleware;
pub use types::*;

pub use tokio_util::sync::CancellationToken;
