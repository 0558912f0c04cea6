//! The single call contract for outbound source calls.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use aniroute_core::{
    AnirouteConfig, AnirouteError, CancellationToken, CircuitSnapshot, RequestContext,
};
use tokio::time::Instant;

use crate::admission::AdmissionGate;
use crate::circuit_breaker::{BreakerRegistry, CircuitBreaker};
use crate::retry::RetryExecutor;
use crate::timeout::TimeoutGuard;

/// Composes retry (outermost), circuit breaker, admission, and timeout around
/// an operation.
///
/// Attempts run inside [`RetryExecutor::run`]. Every attempt re-checks the
/// breaker; an open circuit ends the retry loop because `CircuitOpen` is not
/// retryable. The breaker records each attempt's outcome, so timeouts and
/// cancellations pass through it without counting.
#[derive(Debug)]
pub struct ReliableInvoker {
    retry: RetryExecutor,
    timeout: TimeoutGuard,
    breakers: BreakerRegistry,
    admission: AdmissionGate,
    slow_call_threshold: Duration,
}

impl ReliableInvoker {
    /// Build an invoker from the orchestrator configuration.
    #[must_use]
    pub fn new(config: &AnirouteConfig) -> Self {
        Self {
            retry: RetryExecutor::new(config.retry),
            timeout: TimeoutGuard::new(config.call_timeout),
            breakers: BreakerRegistry::new(config.circuit_breaker),
            admission: AdmissionGate::new(config.max_in_flight),
            slow_call_threshold: config.slow_call_threshold,
        }
    }

    /// Invoke `op` against `provider`. `op` is called once per attempt with
    /// the attempt's cancellation token.
    ///
    /// # Errors
    /// Returns the last attempt's error, `CircuitOpen` when the breaker
    /// rejects an attempt, or `Cancelled` when the request is cancelled.
    pub async fn invoke<T, F, Fut>(
        &self,
        ctx: &RequestContext,
        provider: &str,
        op: F,
    ) -> Result<T, AnirouteError>
    where
        F: Fn(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, AnirouteError>>,
    {
        let breaker = self.breakers.get(provider);
        let breaker = &breaker;
        let op = &op;
        self.retry
            .run(ctx, move |_| self.attempt(ctx, breaker, op))
            .await
    }

    // The breaker permit and admission permit are both released on drop, so
    // an attempt abandoned mid-call (outer timeout, dropped request) leaves
    // neither the trial slot nor a gate slot behind.
    async fn attempt<T, F, Fut>(
        &self,
        ctx: &RequestContext,
        breaker: &Arc<CircuitBreaker>,
        op: &F,
    ) -> Result<T, AnirouteError>
    where
        F: Fn(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, AnirouteError>>,
    {
        let ticket = breaker.try_acquire()?;
        let permit = match self.admission.acquire(ctx).await {
            Ok(p) => p,
            Err(e) => {
                ticket.record(Some(&e));
                return Err(e);
            }
        };

        let started = Instant::now();
        let out = self.timeout.run(ctx, breaker.provider(), op).await;
        drop(permit);

        let elapsed = started.elapsed();
        if elapsed >= self.slow_call_threshold {
            tracing::warn!(
                target: "aniroute::invoker",
                provider = breaker.provider(),
                operation = %ctx.operation(),
                correlation_id = ctx.correlation_id(),
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "slow source call"
            );
        }
        ticket.record(out.as_ref().err());
        out
    }

    /// Breaker view for `provider`.
    #[must_use]
    pub fn circuit(&self, provider: &str) -> CircuitSnapshot {
        self.breakers.snapshot(provider)
    }

    /// Outbound calls currently holding an admission permit.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.admission.in_flight()
    }

    /// The shared admission gate.
    #[must_use]
    pub const fn admission(&self) -> &AdmissionGate {
        &self.admission
    }
}
