use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the aniroute workspace.
///
/// This wraps capability mismatches, argument validation errors, source-tagged
/// failures, resilience rejections (timeouts, open circuits, cancellation), and an
/// aggregate for multi-source attempts.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnirouteError {
    /// The requested capability is not implemented by the target source.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// A capability string describing what was requested (e.g. "streaming-links").
        capability: String,
    },

    /// Issues with the returned or expected data (missing fields, malformed payloads).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// An individual source returned an error (network failure, non-2xx status, ...).
    #[error("{provider} failed: {msg}")]
    Provider {
        /// Source name that failed.
        provider: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),

    /// A resource could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "anime one-piece-100".
        what: String,
    },

    /// All selected sources failed; contains the individual failures.
    #[error("all providers failed: {0:?}")]
    AllProvidersFailed(Vec<AnirouteError>),

    /// An individual source call exceeded its deadline.
    #[error("provider timed out: {capability} via {provider}")]
    ProviderTimeout {
        /// Source name that timed out.
        provider: String,
        /// Capability label (e.g. "search", "trending").
        capability: String,
    },

    /// All attempted sources timed out for the requested capability.
    #[error("all providers timed out: {capability}")]
    AllProvidersTimedOut {
        /// Capability label that timed out across all sources.
        capability: String,
    },

    /// The source's circuit breaker is open; the call was rejected without being attempted.
    #[error("circuit open for {provider}: reset_in_ms={reset_in_ms}")]
    CircuitOpen {
        /// Source whose breaker rejected the call.
        provider: String,
        /// Milliseconds until the breaker admits a half-open trial.
        reset_in_ms: u64,
    },

    /// The caller cancelled the request.
    #[error("operation aborted: {capability}")]
    Cancelled {
        /// Capability label of the aborted operation.
        capability: String,
    },

    /// No registered source is currently available for the capability.
    #[error("no source available: {capability}")]
    NoSourceAvailable {
        /// Capability label that could not be routed.
        capability: String,
    },
}

impl AnirouteError {
    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Helper: build a `Provider` error with the source name and message.
    pub fn provider(provider: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(provider: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            provider: provider.into(),
            capability: capability.into(),
        }
    }

    /// Helper: build a `Cancelled` error.
    #[must_use]
    pub fn cancelled(capability: impl Into<String>) -> Self {
        Self::Cancelled {
            capability: capability.into(),
        }
    }

    /// Helper: build a `CircuitOpen` rejection.
    pub fn circuit_open(provider: impl Into<String>, reset_in_ms: u64) -> Self {
        Self::CircuitOpen {
            provider: provider.into(),
            reset_in_ms,
        }
    }

    /// True when the caller aborted the request.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// True for both ways a guarded call can be cut short: caller cancellation
    /// and deadline expiry.
    #[must_use]
    pub const fn is_abort(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::ProviderTimeout { .. })
    }

    /// True when this outcome should be held against the source by its circuit breaker.
    ///
    /// Cancellation, timeouts, and already-open circuits are excluded.
    #[must_use]
    pub const fn counts_toward_circuit(&self) -> bool {
        !self.is_abort() && !matches!(self, Self::CircuitOpen { .. })
    }

    /// True when another attempt against the same source may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::Cancelled { .. }
                | Self::CircuitOpen { .. }
                | Self::Unsupported { .. }
                | Self::InvalidArg(_)
                | Self::NotFound { .. }
        )
    }

    /// Returns true if this error should be surfaced to operators as actionable.
    ///
    /// Non-actionable errors are those indicating capability absence, a benign
    /// not-found condition, or a caller-initiated abort. Aggregates are
    /// classified based on their contents.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        match self {
            Self::Unsupported { .. } | Self::NotFound { .. } | Self::Cancelled { .. } => false,
            Self::AllProvidersFailed(inner) => inner.iter().any(Self::is_actionable),
            _ => true,
        }
    }

    /// Flatten nested `AllProvidersFailed` structures into a plain vector.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllProvidersFailed(list) => list.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}
