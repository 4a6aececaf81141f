//! Cooperative deadline propagation.
//!
//! A unit of work (request, job) opens a timeout scope. Code anywhere below it
//! asks how much time is left or checks the deadline, and intercepted client
//! calls check it automatically before they touch the network.
//!
//! ```text
//! middleware (http, job) → deadline scope → handler
//!                                              → Intercepted<client>::invoke
//!                                                  → registry layers (check / clear)
//!                                                  → client operation
//! ```

pub mod config;
pub mod deadline;
pub mod error;
pub mod hooks;
pub mod intercept;
pub mod middleware;
pub mod observability;

pub use deadline::{
    check_deadline, clear_deadline, enter, inherit, is_expired, set_duration, time_elapsed,
    time_remaining, timeout, timeout_async, without_deadline, without_deadline_async, DurationSource,
    ScopeGuard,
};
pub use error::{InstallError, TimeoutExceeded};
pub use intercept::{validate, Intercepted, Interceptable, InterceptionRegistry, Validation};
