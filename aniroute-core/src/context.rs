//! Per-request context and the task-local cancellation scope.
//!
//! A caller that wants to abort a façade call wraps it in
//! [`with_cancellation`]. The orchestrator reads the scoped token once when it
//! builds the [`RequestContext`] for that call and passes the context
//! explicitly from there on; nothing below the orchestrator reads the
//! task-local.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use aniroute_types::{AnirouteError, Capability};

tokio::task_local! {
    static CANCEL_SCOPE: CancellationToken;
}

/// Run `fut` with `token` as the cancellation scope of every orchestrator
/// call it makes.
///
/// Cancelling `token` aborts in-flight source calls and pending retry backoff;
/// the aborted calls never count as circuit breaker failures.
pub async fn with_cancellation<F>(token: CancellationToken, fut: F) -> F::Output
where
    F: Future,
{
    CANCEL_SCOPE.scope(token, fut).await
}

/// Token of the enclosing [`with_cancellation`] scope, if any.
#[must_use]
pub fn scoped_token() -> Option<CancellationToken> {
    CANCEL_SCOPE.try_with(Clone::clone).ok()
}

/// Context of one logical request as it travels through retry, breaker,
/// admission, and timeout layers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    operation: Capability,
    correlation_id: u64,
    token: CancellationToken,
    started: Instant,
}

impl RequestContext {
    /// Create a context for `operation` bound to `token`.
    #[must_use]
    pub fn new(operation: Capability, correlation_id: u64, token: CancellationToken) -> Self {
        Self {
            operation,
            correlation_id,
            token,
            started: Instant::now(),
        }
    }

    /// Operation label.
    #[must_use]
    pub const fn operation(&self) -> Capability {
        self.operation
    }

    /// Monotonic id shared by every event of this request.
    #[must_use]
    pub const fn correlation_id(&self) -> u64 {
        self.correlation_id
    }

    /// The request's cancellation token.
    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// True once the caller has cancelled the request.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The error reported when this request is aborted by its caller.
    #[must_use]
    pub fn cancelled_error(&self) -> AnirouteError {
        AnirouteError::cancelled(self.operation.as_str())
    }

    /// Time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
