//! Checkpoint API.
//!
//! Cheap queries against the current execution unit's deadline. Every call is
//! a clock read plus a comparison; none of them block.

use std::time::Duration;

use crate::deadline::clock;
use crate::deadline::context;
use crate::deadline::duration::DurationSource;
use crate::error::TimeoutExceeded;

/// Time left before the active deadline. `None` means no limit.
pub fn time_remaining() -> Option<Duration> {
    context::current()
        .deadline
        .map(|deadline| deadline.saturating_duration_since(clock::now()))
}

/// Time since the innermost scope started. `None` outside any scope.
pub fn time_elapsed() -> Option<Duration> {
    context::current()
        .started_at
        .map(|started_at| clock::now().saturating_duration_since(started_at))
}

/// True when a deadline is active and has passed.
pub fn is_expired() -> bool {
    matches!(context::current().deadline, Some(deadline) if clock::now() > deadline)
}

/// Fail if the active deadline has passed.
///
/// On failure the innermost scope's deadline is cleared, so repeated checks in
/// the same scope signal at most once.
pub fn check_deadline() -> Result<(), TimeoutExceeded> {
    let state = context::current();
    let Some(deadline) = state.deadline else {
        return Ok(());
    };

    let now = clock::now();
    if now <= deadline {
        return Ok(());
    }

    let elapsed = state
        .started_at
        .map_or(Duration::ZERO, |started_at| now.saturating_duration_since(started_at));
    context::store(state.cleared());

    tracing::warn!(elapsed_secs = elapsed.as_secs_f64(), "Request deadline exceeded");
    Err(TimeoutExceeded::new(elapsed))
}

/// Re-anchor the innermost scope: its clock restarts now with a new budget.
///
/// The new deadline never goes past the one inherited from the enclosing
/// scope. Does nothing outside a scope.
pub fn set_duration(duration: impl Into<DurationSource>) {
    set_duration_with(&duration.into(), &());
}

/// [`set_duration`] with a budget resolved against `ctx`.
pub fn set_duration_with<C: ?Sized>(source: &DurationSource<C>, ctx: &C) {
    let state = context::current();
    if !state.in_scope() {
        return;
    }

    let budget = source.resolve(ctx);
    let state = state.reanchor(budget, clock::now());
    tracing::trace!(budget = ?budget, deadline = ?state.deadline, "Re-anchored timeout scope");
    context::store(state);
}

/// Remove the active deadline for the rest of the innermost scope.
///
/// The enclosing scope's deadline comes back once this scope exits.
pub fn clear_deadline() {
    let state = context::current();
    if state.in_scope() {
        context::store(state.cleared());
    }
}
