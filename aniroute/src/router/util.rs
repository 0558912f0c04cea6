use aniroute_core::{AnirouteError, Capability, RequestContext};

/// Collapse a set of per-source errors into a uniform `AnirouteError` outcome.
///
/// Rules:
/// - If any error is a cancellation → that cancellation.
/// - If all errors are `ProviderTimeout` → `AllProvidersTimedOut(capability)`.
/// - If all errors are `NotFound` → `NotFound(capability)`.
/// - Else → `AllProvidersFailed(errors)`.
pub fn collapse_errors(capability: Capability, errors: Vec<AnirouteError>) -> AnirouteError {
    if let Some(cancelled) = errors.iter().find(|e| e.is_cancellation()) {
        return cancelled.clone();
    }
    if errors.is_empty() {
        return AnirouteError::AllProvidersFailed(errors);
    }
    if errors
        .iter()
        .all(|e| matches!(e, AnirouteError::ProviderTimeout { .. }))
    {
        return AnirouteError::AllProvidersTimedOut {
            capability: capability.to_string(),
        };
    }
    if errors
        .iter()
        .all(|e| matches!(e, AnirouteError::NotFound { .. }))
    {
        return AnirouteError::not_found(capability.to_string());
    }
    AnirouteError::AllProvidersFailed(errors)
}

/// Resolve a content operation to its value, or to `fallback()` once every
/// source has been exhausted. The failure is logged, never returned.
///
/// Exhaustion made only of benign outcomes (not-found, unsupported) logs at
/// debug; anything an operator could act on logs at warn.
pub(crate) fn settle<T>(
    ctx: &RequestContext,
    outcome: Result<T, AnirouteError>,
    fallback: impl FnOnce() -> T,
) -> T {
    match outcome {
        Ok(v) => v,
        Err(e) if e.is_cancellation() => {
            tracing::debug!(
                target: "aniroute::router",
                operation = %ctx.operation(),
                correlation_id = ctx.correlation_id(),
                "request cancelled"
            );
            fallback()
        }
        Err(e) if !e.is_actionable() => {
            tracing::debug!(
                target: "aniroute::router",
                operation = %ctx.operation(),
                correlation_id = ctx.correlation_id(),
                error = %e,
                "nothing found; returning default"
            );
            fallback()
        }
        Err(e) => {
            tracing::warn!(
                target: "aniroute::router",
                operation = %ctx.operation(),
                correlation_id = ctx.correlation_id(),
                attempts = ?e.clone().flatten(),
                "all sources exhausted; returning default"
            );
            fallback()
        }
    }
}
