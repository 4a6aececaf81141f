//! Timeout scopes.
//!
//! # Responsibilities
//! - Install the effective deadline on entry (tighter of the new budget and
//!   anything inherited)
//! - Restore the exact previous state on every exit path, unwinding included
//! - Bind deadlines to tasks for async units of work
//!
//! # Design Decisions
//! - Sync scopes are RAII guards, restored in `Drop`
//! - Guards are `!Send` so they cannot be held across an `.await` in a spawned
//!   task; async work goes through [`timeout_async`] instead
//! - Spawned tasks start without a deadline unless wrapped with [`inherit`]

use std::future::Future;
use std::marker::PhantomData;

use crate::deadline::clock;
use crate::deadline::context::{self, DeadlineState};
use crate::deadline::duration::DurationSource;

/// Guard for an active timeout scope.
///
/// Dropping the guard restores the deadline state captured at entry.
#[must_use = "the scope ends as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ScopeGuard {
    saved: DeadlineState,
    _unsend: PhantomData<*const ()>,
}

impl ScopeGuard {
    pub(crate) fn install(state: DeadlineState) -> Self {
        Self {
            saved: context::replace(state),
            _unsend: PhantomData,
        }
    }

    /// State that will be restored when this guard is dropped.
    pub fn saved(&self) -> DeadlineState {
        self.saved
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        context::store(self.saved);
    }
}

/// Enter a timeout scope.
pub fn enter(duration: impl Into<DurationSource>) -> ScopeGuard {
    enter_with(&duration.into(), &())
}

/// Enter a timeout scope whose budget may depend on adapter context.
pub fn enter_with<C: ?Sized>(source: &DurationSource<C>, ctx: &C) -> ScopeGuard {
    let budget = source.resolve(ctx);
    let state = context::current().child(budget, clock::now());
    tracing::trace!(budget = ?budget, deadline = ?state.deadline, "Entering timeout scope");
    ScopeGuard::install(state)
}

/// Leave a scope explicitly. Equivalent to dropping the guard.
pub fn exit(guard: ScopeGuard) {
    drop(guard);
}

/// Run `f` inside a timeout scope and return its result.
pub fn timeout<R>(duration: impl Into<DurationSource>, f: impl FnOnce() -> R) -> R {
    let _scope = enter(duration);
    f()
}

/// Run `f` inside a timeout scope resolved against `ctx`.
pub fn timeout_with<C: ?Sized, R>(source: &DurationSource<C>, ctx: &C, f: impl FnOnce() -> R) -> R {
    let _scope = enter_with(source, ctx);
    f()
}

/// Run `fut` inside a timeout scope bound to the polling task.
///
/// The scope starts when this is called, not on first poll.
pub fn timeout_async<F: Future>(
    duration: impl Into<DurationSource>,
    fut: F,
) -> impl Future<Output = F::Output> {
    timeout_async_with(&duration.into(), &(), fut)
}

/// Async variant of [`timeout_with`].
pub fn timeout_async_with<C: ?Sized, F: Future>(
    source: &DurationSource<C>,
    ctx: &C,
    fut: F,
) -> impl Future<Output = F::Output> {
    let budget = source.resolve(ctx);
    let state = context::current().child(budget, clock::now());
    tracing::trace!(budget = ?budget, deadline = ?state.deadline, "Entering async timeout scope");
    context::bind(state, fut)
}

/// Run `f` with no deadline at all, then restore the enclosing one.
///
/// Used to exempt work that must finish regardless of the ambient budget,
/// such as cleanup after a timeout.
pub fn without_deadline<R>(f: impl FnOnce() -> R) -> R {
    let _scope = ScopeGuard::install(DeadlineState::unbounded(clock::now()));
    f()
}

/// Async variant of [`without_deadline`].
pub fn without_deadline_async<F: Future>(fut: F) -> impl Future<Output = F::Output> {
    context::bind(DeadlineState::unbounded(clock::now()), fut)
}

/// Carry the caller's deadline into `fut`, typically before `tokio::spawn`.
pub fn inherit<F: Future>(fut: F) -> impl Future<Output = F::Output> {
    context::bind(context::current(), fut)
}
