//! Deadline propagation subsystem.
//!
//! # Data Flow
//! ```text
//! Entry-point adapter (HTTP middleware, job runner):
//!     → scope.rs (enter scope: now + budget, clamped by inherited deadline)
//!     → context.rs (state stored per thread or per task)
//!
//! Anywhere below, typically inside an intercepted client call:
//!     → checkpoint.rs (check_deadline: clock read + compare)
//!     → Err(TimeoutExceeded) propagates like any other client error
//!
//! Scope exit (normal, early return, unwind):
//!     → guard drop / task-local scope end restores the previous state
//! ```
//!
//! # Design Decisions
//! - Cooperative only: nothing is preempted, the next checkpoint fails
//! - One monotonic clock, local to the process
//! - Nested scopes can only shrink the remaining budget

pub mod checkpoint;
pub mod clock;
pub mod context;
pub mod duration;
pub mod scope;

pub use checkpoint::{
    check_deadline, clear_deadline, is_expired, set_duration, set_duration_with, time_elapsed,
    time_remaining,
};
pub use context::{current, DeadlineState};
pub use duration::{secs_f64, DurationSource};
pub use scope::{
    enter, enter_with, exit, inherit, timeout, timeout_async, timeout_async_with, timeout_with,
    without_deadline, without_deadline_async, ScopeGuard,
};
