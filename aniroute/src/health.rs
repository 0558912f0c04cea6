//! Periodic health probing.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use aniroute_core::{HealthConfig, HealthState, SourceHealth};
use chrono::Utc;
use futures::future::join_all;
use tokio::time::Instant;

use crate::registry::{RegisteredSource, SourceRegistry};

/// Health records keyed by source name, one per registered source.
pub type HealthSnapshot = Arc<BTreeMap<String, SourceHealth>>;

/// Probes every source concurrently and publishes the results as one
/// snapshot.
///
/// Probes call `health_check` directly: they bypass the admission gate and
/// the circuit breakers so a tripped breaker never hides a recovered source.
#[derive(Debug)]
pub struct HealthMonitor {
    config: HealthConfig,
    snapshot: RwLock<HealthSnapshot>,
}

impl HealthMonitor {
    /// Monitor seeded with an `Online` record (no latency) per source.
    #[must_use]
    pub fn new(config: HealthConfig, registry: &SourceRegistry) -> Self {
        let now = Utc::now();
        let seeded = registry
            .sources()
            .iter()
            .map(|s| {
                (
                    s.name().to_string(),
                    SourceHealth {
                        state: HealthState::Online,
                        latency_ms: None,
                        checked_at: now,
                    },
                )
            })
            .collect();
        Self {
            config,
            snapshot: RwLock::new(Arc::new(seeded)),
        }
    }

    /// Configured probe settings.
    #[must_use]
    pub const fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// The latest published snapshot. May lag an in-progress cycle.
    ///
    /// # Panics
    /// Panics if the snapshot lock was poisoned.
    #[must_use]
    pub fn snapshot(&self) -> HealthSnapshot {
        Arc::clone(&self.snapshot.read().expect("snapshot lock poisoned"))
    }

    /// Run one probe cycle: probe all sources concurrently, publish the new
    /// snapshot, then align every availability flag with it.
    ///
    /// # Panics
    /// Panics if the snapshot lock was poisoned.
    pub async fn check_all(&self, registry: &SourceRegistry) -> HealthSnapshot {
        let probes = registry.sources().iter().map(|s| async move {
            let health = self.probe(s).await;
            (s.name().to_string(), health)
        });
        let results: BTreeMap<String, SourceHealth> = join_all(probes).await.into_iter().collect();
        let snapshot: HealthSnapshot = Arc::new(results);

        *self.snapshot.write().expect("snapshot lock poisoned") = Arc::clone(&snapshot);

        let mut counts = [0usize; 3];
        for s in registry.sources() {
            let state = snapshot
                .get(s.name())
                .map_or(HealthState::Offline, |h| h.state);
            match state {
                HealthState::Online => counts[0] += 1,
                HealthState::Degraded => counts[1] += 1,
                HealthState::Offline => counts[2] += 1,
            }
            let was = s.set_available(state.is_available());
            if was != state.is_available() {
                tracing::info!(
                    target: "aniroute::health",
                    source = s.name(),
                    available = state.is_available(),
                    "availability changed"
                );
            }
        }
        tracing::info!(
            target: "aniroute::health",
            online = counts[0],
            degraded = counts[1],
            offline = counts[2],
            "health cycle complete"
        );
        snapshot
    }

    async fn probe(&self, source: &RegisteredSource) -> SourceHealth {
        let started = Instant::now();
        let outcome = tokio::time::timeout(self.config.probe_timeout, source.source().health_check()).await;
        let latency = started.elapsed();
        let latency_ms = Some(millis(latency));

        let (state, latency_ms) = match outcome {
            Ok(Ok(true)) if latency > self.config.degraded_latency => {
                tracing::warn!(
                    target: "aniroute::health",
                    source = source.name(),
                    latency_ms = millis(latency),
                    "source degraded"
                );
                (HealthState::Degraded, latency_ms)
            }
            Ok(Ok(true)) => (HealthState::Online, latency_ms),
            Ok(Ok(false)) => {
                tracing::warn!(target: "aniroute::health", source = source.name(), "source reported unhealthy");
                (HealthState::Offline, latency_ms)
            }
            Ok(Err(e)) => {
                tracing::warn!(target: "aniroute::health", source = source.name(), error = %e, "health probe failed");
                (HealthState::Offline, latency_ms)
            }
            Err(_) => {
                tracing::warn!(
                    target: "aniroute::health",
                    source = source.name(),
                    timeout_ms = millis(self.config.probe_timeout),
                    "health probe timed out"
                );
                (HealthState::Offline, None)
            }
        };

        SourceHealth {
            state,
            latency_ms,
            checked_at: Utc::now(),
        }
    }
}

pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
