//! Per-execution-unit deadline state.
//!
//! # Storage
//! - Inside an async scope the state lives in a tokio task-local, so it moves
//!   with the task across worker threads and is never seen by other tasks.
//! - Everywhere else it lives in a thread-local.
//!
//! Reads check the task-local first and fall back to the thread-local. State is
//! `Copy`, so every access is a plain load or store through a `Cell`.

use std::cell::Cell;
use std::future::Future;
use std::time::Duration;

use crate::deadline::clock::Instant;

/// Snapshot of the deadline state for one execution unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeadlineState {
    /// Instant past which the unit of work is expired. `None` means no limit.
    pub(crate) deadline: Option<Instant>,
    /// When the innermost scope started, or was last re-anchored.
    pub(crate) started_at: Option<Instant>,
    /// Effective deadline of the enclosing scope at entry.
    /// Re-anchoring the current scope never goes past it.
    pub(crate) ceiling: Option<Instant>,
}

impl DeadlineState {
    /// State outside any scope.
    pub const EMPTY: DeadlineState = DeadlineState {
        deadline: None,
        started_at: None,
        ceiling: None,
    };

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// True when some scope is active.
    pub fn in_scope(&self) -> bool {
        self.started_at.is_some()
    }

    /// State for a scope nested inside `self`, starting at `now`.
    ///
    /// The child deadline is the tighter of `now + budget` and the inherited
    /// deadline; an unlimited child keeps the inherited one.
    pub(crate) fn child(self, budget: Option<Duration>, now: Instant) -> DeadlineState {
        DeadlineState {
            deadline: tighter(expiry(now, budget), self.deadline),
            started_at: Some(now),
            ceiling: self.deadline,
        }
    }

    /// Restart the current scope at `now` with a new budget, bounded by the ceiling.
    pub(crate) fn reanchor(self, budget: Option<Duration>, now: Instant) -> DeadlineState {
        DeadlineState {
            deadline: tighter(expiry(now, budget), self.ceiling),
            started_at: Some(now),
            ceiling: self.ceiling,
        }
    }

    /// A scope with no deadline at all, ignoring anything inherited.
    pub(crate) fn unbounded(now: Instant) -> DeadlineState {
        DeadlineState {
            deadline: None,
            started_at: Some(now),
            ceiling: None,
        }
    }

    pub(crate) fn cleared(self) -> DeadlineState {
        DeadlineState {
            deadline: None,
            ..self
        }
    }
}

fn expiry(now: Instant, budget: Option<Duration>) -> Option<Instant> {
    budget.and_then(|d| now.checked_add(d))
}

fn tighter(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

thread_local! {
    static THREAD_STATE: Cell<DeadlineState> = const { Cell::new(DeadlineState::EMPTY) };
}

tokio::task_local! {
    static TASK_STATE: Cell<DeadlineState>;
}

/// Current state for this execution unit.
pub fn current() -> DeadlineState {
    match TASK_STATE.try_with(|state| state.get()) {
        Ok(state) => state,
        // Thread-local storage may already be torn down during thread exit.
        Err(_) => THREAD_STATE.try_with(|state| state.get()).unwrap_or_default(),
    }
}

pub(crate) fn store(state: DeadlineState) {
    if TASK_STATE.try_with(|cell| cell.set(state)).is_err() {
        let _ = THREAD_STATE.try_with(|cell| cell.set(state));
    }
}

/// Store `state` and return what it replaced.
pub(crate) fn replace(state: DeadlineState) -> DeadlineState {
    let previous = current();
    store(state);
    previous
}

/// Run `fut` with `state` bound to the polling task.
///
/// The enclosing state is untouched and visible again once `fut` completes
/// or is dropped.
pub(crate) fn bind<F: Future>(state: DeadlineState, fut: F) -> impl Future<Output = F::Output> {
    TASK_STATE.scope(Cell::new(state), fut)
}

/// True when the caller is polled inside an async scope.
pub fn is_task_bound() -> bool {
    TASK_STATE.try_with(|_| ()).is_ok()
}
