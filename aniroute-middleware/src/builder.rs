//! Builder for composing sources with middleware layers.
//!
//! Layers form an "onion" around the raw source. They are stored
//! outermost-first (last added = outermost) and applied in reverse during
//! `build()`:
//!
//! ```text
//! builder.with_cache(..).layer(custom)
//!
//! Storage: [custom, Cache]
//! Result:  custom(Cache(Raw))
//! ```
//!
//! Resilience (retry, breaker, timeout, admission) is not a layer: the
//! orchestrator applies it uniformly through `ReliableInvoker` so that every
//! source shares one admission gate and one breaker registry.

use std::sync::Arc;

use aniroute_core::connector::AnimeSource;
use aniroute_core::{CacheConfig, Middleware};
use serde_json::json;

use crate::cache::CacheMiddleware;

const CACHE_LAYER: &str = "CachingMiddleware";

/// Generic middleware builder for composing a source with layered wrappers.
pub struct SourceBuilder {
    raw: Arc<dyn AnimeSource>,
    layers: Vec<Box<dyn Middleware>>,
}

impl SourceBuilder {
    /// Create a new builder from a raw, unwrapped source.
    #[must_use]
    pub fn new(raw: Arc<dyn AnimeSource>) -> Self {
        Self {
            raw,
            layers: Vec::new(),
        }
    }

    /// Add or replace response caching at the outermost position.
    #[must_use]
    pub fn with_cache(mut self, cfg: &CacheConfig) -> Self {
        self.layers.retain(|m| m.name() != CACHE_LAYER);
        self.layers.insert(0, Box::new(CacheMiddleware::new(*cfg)));
        self
    }

    /// Remove caching if present.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.layers.retain(|m| m.name() != CACHE_LAYER);
        self
    }

    /// Add an arbitrary middleware layer at the outermost position.
    #[must_use]
    pub fn layer(mut self, layer: Box<dyn Middleware>) -> Self {
        self.layers.insert(0, layer);
        self
    }

    /// Describe the stack, outermost first, with the raw source last.
    #[must_use]
    pub fn describe(&self) -> serde_json::Value {
        let mut out: Vec<serde_json::Value> = self
            .layers
            .iter()
            .map(|l| json!({ "name": l.name(), "config": l.config_json() }))
            .collect();
        out.push(json!({ "name": "RawSource", "config": { "name": self.raw.name() } }));
        serde_json::Value::Array(out)
    }

    /// Build the wrapped source, applying layers innermost first.
    #[must_use]
    pub fn build(self) -> Arc<dyn AnimeSource> {
        let mut acc: Arc<dyn AnimeSource> = Arc::clone(&self.raw);
        for m in self.layers.into_iter().rev() {
            acc = m.apply(acc);
        }
        acc
    }
}
