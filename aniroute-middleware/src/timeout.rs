//! Deadline guard for a single attempt.

use std::future::Future;
use std::time::Duration;

use aniroute_core::{AnirouteError, CancellationToken, RequestContext};

/// Races one attempt against a deadline and the request's cancellation token.
///
/// The attempt runs under a child token of the request. Deadline expiry and
/// parent cancellation both cancel the child and drop the attempt's future.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutGuard {
    deadline: Duration,
}

impl TimeoutGuard {
    /// Guard attempts with `deadline`.
    #[must_use]
    pub const fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    /// Configured deadline.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run `op` under the deadline. `op` receives the attempt's child token.
    ///
    /// # Errors
    /// `Cancelled` when the request is cancelled, `ProviderTimeout` tagged with
    /// `provider` when the deadline expires, otherwise whatever `op` returns.
    pub async fn run<T, F, Fut>(
        &self,
        ctx: &RequestContext,
        provider: &str,
        op: F,
    ) -> Result<T, AnirouteError>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, AnirouteError>>,
    {
        if ctx.is_cancelled() {
            return Err(ctx.cancelled_error());
        }
        let scope = ctx.token().child_token();
        let _release = scope.clone().drop_guard();
        let attempt = op(scope.clone());

        tokio::select! {
            biased;
            () = ctx.token().cancelled() => Err(ctx.cancelled_error()),
            res = tokio::time::timeout(self.deadline, attempt) => match res {
                Ok(out) => out,
                Err(_) => {
                    scope.cancel();
                    Err(AnirouteError::provider_timeout(provider, ctx.operation().as_str()))
                }
            },
        }
    }
}
