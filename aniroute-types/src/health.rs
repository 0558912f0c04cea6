//! Health and circuit-state snapshots for operational inspection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of the most recent health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthState {
    /// Probe succeeded within the degraded-latency threshold.
    Online,
    /// Probe failed, returned unhealthy, or timed out.
    Offline,
    /// Probe succeeded but slower than the degraded-latency threshold.
    Degraded,
}

impl HealthState {
    /// Whether a source in this state should be routed to.
    #[must_use]
    pub const fn is_available(self) -> bool {
        !matches!(self, Self::Offline)
    }
}

/// Health record for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceHealth {
    /// Probe outcome.
    pub state: HealthState,
    /// Measured probe latency; `None` before the first probe or when it timed out.
    pub latency_ms: Option<u64>,
    /// When the record was produced.
    pub checked_at: DateTime<Utc>,
}

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CircuitState {
    /// Calls pass through.
    #[default]
    Closed,
    /// Calls are rejected without being attempted.
    Open,
    /// One trial call decides between closing and re-opening.
    HalfOpen,
}

/// Point-in-time view of one breaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitSnapshot {
    /// Current state (as last evaluated; transitions are lazy).
    pub state: CircuitState,
    /// Consecutive countable failures.
    pub failures: u32,
    /// Milliseconds since the last recorded failure.
    pub last_failure_age_ms: Option<u64>,
}

impl Default for CircuitSnapshot {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            last_failure_age_ms: None,
        }
    }
}

/// Operational view of one registered source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStatus {
    /// Source name.
    pub name: String,
    /// Whether the orchestrator currently routes to it.
    pub available: bool,
    /// Latest health record.
    pub health: Option<SourceHealth>,
    /// Breaker view.
    pub circuit: CircuitSnapshot,
    /// Advertised capability labels.
    pub capabilities: Vec<String>,
}

/// Read-only report for monitoring endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResilienceReport {
    /// Current priority order.
    pub priority: Vec<String>,
    /// Per-source status in registration order.
    pub sources: Vec<SourceStatus>,
    /// Outbound calls currently holding an admission permit.
    pub in_flight: usize,
}
