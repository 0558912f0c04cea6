//! Global concurrency ceiling for outbound source calls.

use std::sync::Arc;

use aniroute_core::{AnirouteError, RequestContext};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// FIFO-fair admission gate in front of every outbound call.
///
/// Waiters are served in arrival order. Waiting is cancellable through the
/// request's token. Health probes do not pass through the gate.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionGate {
    /// Gate admitting at most `capacity` concurrent calls (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a permit. Dropping the permit releases the slot.
    ///
    /// # Errors
    /// Returns `Cancelled` when the request is cancelled while waiting.
    pub async fn acquire(&self, ctx: &RequestContext) -> Result<OwnedSemaphorePermit, AnirouteError> {
        tokio::select! {
            biased;
            () = ctx.token().cancelled() => Err(ctx.cancelled_error()),
            permit = Arc::clone(&self.permits).acquire_owned() => {
                permit.map_err(|_| AnirouteError::Other("admission gate closed".into()))
            }
        }
    }

    /// Calls currently holding a permit.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.capacity.saturating_sub(self.permits.available_permits())
    }

    /// Configured ceiling.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
