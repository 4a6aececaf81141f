//! Interception subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (single-threaded):
//!     hooks adapters
//!         → registry.rs (install / install_clear_on_call, identity guard)
//!
//! Request time:
//!     Intercepted<T>::invoke("exec_query", ..)   or   tower Service::call
//!         → registry.rs (lock-free layer lookup for T)
//!         → layers, last installed first (check or clear)
//!         → wrapped operation
//! ```
//!
//! # Design Decisions
//! - Wrapping is done by a decorator chosen at composition time; nothing
//!   mutates the wrapped type
//! - No uninstall; layers live for the process
//! - Unrelated adapters install separate layers and never see each other

pub mod hooked;
pub mod layer;
pub mod registry;

pub use hooked::{Intercepted, Operation};
pub use layer::{CheckDeadline, CheckDeadlineLayer, ClearDeadline, ClearDeadlineLayer, InterceptLayer};
pub use registry::{validate, HookAction, Interceptable, InterceptionRegistry, HookLayer, Layers, Validation};
