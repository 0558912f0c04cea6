//! Per-source failure-count circuit breaker.
//!
//! State transitions are evaluated lazily when a caller asks for admission;
//! there is no background timer. Only outcomes for which
//! [`AnirouteError::counts_toward_circuit`] holds move the failure counter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aniroute_core::{AnirouteError, CircuitBreakerConfig, CircuitSnapshot, CircuitState};
use tokio::time::Instant;

/// How a call was let through the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Closed circuit; regular call.
    Normal,
    /// The single half-open trial call.
    Trial,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failures: u32,
    last_failure: Option<Instant>,
    trial_in_flight: bool,
}

/// Admission ticket returned by [`CircuitBreaker::try_acquire`].
///
/// Dropping an unsettled trial permit (the caller's future was dropped
/// mid-call) releases the half-open slot so the next caller gets a trial.
#[derive(Debug)]
#[must_use = "an unsettled permit records nothing"]
pub struct BreakerPermit<'a> {
    breaker: &'a CircuitBreaker,
    admission: Admission,
    settled: bool,
}

impl BreakerPermit<'_> {
    /// How the call was let through.
    #[must_use]
    pub const fn admission(&self) -> Admission {
        self.admission
    }

    /// Record the outcome of the admitted call; `failure` is `None` on success.
    ///
    /// # Panics
    /// Panics if the breaker's mutex is poisoned.
    pub fn record(mut self, failure: Option<&AnirouteError>) {
        self.settled = true;
        self.breaker.settle(self.admission, failure);
    }
}

impl Drop for BreakerPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.admission == Admission::Trial {
            self.breaker.abandon();
        }
    }
}

/// Breaker guarding one source.
#[derive(Debug)]
pub struct CircuitBreaker {
    provider: String,
    config: CircuitBreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a closed breaker for `provider`.
    pub fn new(provider: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            provider: provider.into(),
            config,
            state: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failures: 0,
                last_failure: None,
                trial_in_flight: false,
            }),
        }
    }

    /// Source this breaker guards.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Ask to run a call.
    ///
    /// An open breaker whose reset window has elapsed moves to half-open and
    /// admits exactly one trial; callers arriving while the trial is in flight
    /// are rejected as if the breaker were open. The returned permit must be
    /// settled with [`BreakerPermit::record`]; a permit dropped unsettled
    /// frees the trial slot and leaves the state as it was.
    ///
    /// # Errors
    /// Returns `CircuitOpen` with the remaining reset time when the call must
    /// not reach the source.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    pub fn try_acquire(&self) -> Result<BreakerPermit<'_>, AnirouteError> {
        let mut guard = self.state.lock().expect("mutex poisoned");
        let admission = match guard.state {
            CircuitState::Closed => Admission::Normal,
            CircuitState::Open => {
                let elapsed = guard
                    .last_failure
                    .map_or(self.config.reset_timeout, |at| at.elapsed());
                if elapsed < self.config.reset_timeout {
                    return Err(self.rejection(self.config.reset_timeout - elapsed));
                }
                guard.state = CircuitState::HalfOpen;
                guard.trial_in_flight = true;
                tracing::debug!(
                    target: "aniroute::breaker",
                    provider = %self.provider,
                    "circuit half-open; admitting trial call"
                );
                Admission::Trial
            }
            CircuitState::HalfOpen => {
                if guard.trial_in_flight {
                    return Err(self.rejection(Duration::ZERO));
                }
                guard.trial_in_flight = true;
                Admission::Trial
            }
        };
        Ok(BreakerPermit {
            breaker: self,
            admission,
            settled: false,
        })
    }

    fn settle(&self, admission: Admission, failure: Option<&AnirouteError>) {
        let mut guard = self.state.lock().expect("mutex poisoned");
        if admission == Admission::Trial {
            guard.trial_in_flight = false;
        }
        match failure {
            None => {
                let was = guard.state;
                guard.state = CircuitState::Closed;
                guard.failures = 0;
                if was != CircuitState::Closed {
                    tracing::info!(
                        target: "aniroute::breaker",
                        provider = %self.provider,
                        "circuit closed after successful trial"
                    );
                }
            }
            Some(err) if err.counts_toward_circuit() => {
                guard.failures = guard.failures.saturating_add(1);
                guard.last_failure = Some(Instant::now());
                let trip = match guard.state {
                    CircuitState::HalfOpen => true,
                    CircuitState::Closed => guard.failures >= self.config.failure_threshold,
                    CircuitState::Open => false,
                };
                if trip {
                    guard.state = CircuitState::Open;
                    tracing::warn!(
                        target: "aniroute::breaker",
                        provider = %self.provider,
                        failures = guard.failures,
                        error = %err,
                        "circuit opened"
                    );
                }
            }
            // Aborts and rejections release the trial slot without a transition.
            Some(_) => {}
        }
    }

    fn abandon(&self) {
        let mut guard = self.state.lock().expect("mutex poisoned");
        guard.trial_in_flight = false;
        tracing::debug!(
            target: "aniroute::breaker",
            provider = %self.provider,
            "trial call dropped before completing; slot released"
        );
    }

    /// Point-in-time view of this breaker as last evaluated.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> CircuitSnapshot {
        let guard = self.state.lock().expect("mutex poisoned");
        CircuitSnapshot {
            state: guard.state,
            failures: guard.failures,
            last_failure_age_ms: guard
                .last_failure
                .map(|at| u64::try_from(at.elapsed().as_millis()).unwrap_or(u64::MAX)),
        }
    }

    fn rejection(&self, remaining: Duration) -> AnirouteError {
        AnirouteError::circuit_open(
            self.provider.clone(),
            u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
        )
    }
}

/// Lazily populated map of one breaker per source name.
#[derive(Debug)]
pub struct BreakerRegistry {
    config: CircuitBreakerConfig,
    breakers: Mutex<HashMap<String, Arc<CircuitBreaker>>>,
}

impl BreakerRegistry {
    /// Create an empty registry; breakers share `config`.
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            breakers: Mutex::new(HashMap::new()),
        }
    }

    /// Breaker for `provider`, created on first access.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    pub fn get(&self, provider: &str) -> Arc<CircuitBreaker> {
        let mut map = self.breakers.lock().expect("mutex poisoned");
        if let Some(b) = map.get(provider) {
            return Arc::clone(b);
        }
        let breaker = Arc::new(CircuitBreaker::new(provider, self.config));
        map.insert(provider.to_string(), Arc::clone(&breaker));
        breaker
    }

    /// Snapshot for `provider`; a source that was never called reports closed.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn snapshot(&self, provider: &str) -> CircuitSnapshot {
        let map = self.breakers.lock().expect("mutex poisoned");
        map.get(provider)
            .map(|b| b.snapshot())
            .unwrap_or_default()
    }
}
