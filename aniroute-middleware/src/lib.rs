//! aniroute-middleware
//!
//! Resilience primitives applied to every outbound source call, plus
//! composable source wrappers.
//!
//! - [`RetryExecutor`]: bounded attempts with exponential backoff.
//! - [`TimeoutGuard`]: per-attempt deadline under a child cancellation token.
//! - [`CircuitBreaker`]: per-source failure-count state machine.
//! - [`AdmissionGate`]: global FIFO ceiling on in-flight calls.
//! - [`ReliableInvoker`]: retry → breaker → admission → timeout → operation.
//! - [`SourceBuilder`] / [`CacheMiddleware`]: response caching layer.

mod admission;
mod builder;
mod cache;
mod circuit_breaker;
mod invoker;
mod retry;
mod timeout;

pub use crate::admission::AdmissionGate;
pub use crate::builder::SourceBuilder;
pub use crate::cache::{CacheMiddleware, CachingSource};
pub use crate::circuit_breaker::{Admission, BreakerPermit, BreakerRegistry, CircuitBreaker};
pub use crate::invoker::ReliableInvoker;
pub use crate::retry::RetryExecutor;
pub use crate::timeout::TimeoutGuard;
