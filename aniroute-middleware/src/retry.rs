//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use aniroute_core::{AnirouteError, RequestContext, RetryConfig};

/// Runs an operation up to `max_attempts` times, sleeping
/// `base_delay * 2^(attempt-1)` between attempts.
///
/// Non-retryable errors (cancellation, open circuits, not-found, invalid
/// arguments, unsupported capabilities) end the loop at once. Exhaustion
/// returns the last error unchanged. Backoff sleeps race the request's
/// cancellation token.
#[derive(Debug, Clone, Copy)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create an executor from a retry policy.
    #[must_use]
    pub const fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Effective attempt ceiling (never below one).
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts.max(1)
    }

    /// Delay before the next attempt, or `None` when `err` after `attempt`
    /// attempts should be returned to the caller.
    #[must_use]
    pub fn next_delay(&self, attempt: u32, err: &AnirouteError) -> Option<Duration> {
        if attempt >= self.max_attempts() || !err.is_retryable() {
            return None;
        }
        Some(self.config.delay_for_attempt(attempt))
    }

    /// Sleep for `delay` unless the request is cancelled first.
    ///
    /// # Errors
    /// Returns `Cancelled` when the request's token fires during the sleep.
    pub async fn backoff(&self, ctx: &RequestContext, delay: Duration) -> Result<(), AnirouteError> {
        tokio::select! {
            biased;
            () = ctx.token().cancelled() => Err(ctx.cancelled_error()),
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }

    /// Run `op` with retries. `op` receives the 1-based attempt number.
    ///
    /// # Errors
    /// Returns the last error once attempts are exhausted or a non-retryable
    /// error occurs, and `Cancelled` if the request is cancelled before the
    /// first attempt or during a backoff.
    pub async fn run<T, F, Fut>(&self, ctx: &RequestContext, mut op: F) -> Result<T, AnirouteError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AnirouteError>>,
    {
        if ctx.is_cancelled() {
            return Err(ctx.cancelled_error());
        }
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(v) => return Ok(v),
                Err(err) => {
                    let Some(delay) = self.next_delay(attempt, &err) else {
                        return Err(err);
                    };
                    tracing::debug!(
                        target: "aniroute::retry",
                        operation = %ctx.operation(),
                        correlation_id = ctx.correlation_id(),
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "retrying after backoff"
                    );
                    self.backoff(ctx, delay).await?;
                    attempt += 1;
                }
            }
        }
    }
}
