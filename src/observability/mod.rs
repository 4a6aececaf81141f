//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! deadline / intercept / hooks / middleware
//!     → tracing macros (structured events)
//!     → logging.rs (EnvFilter + fmt layer)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Library code only emits events; installing a subscriber is the binary's call
//! - Scope entry is `trace`, installs are `info`, exceeded deadlines are `warn`

pub mod logging;

pub use logging::init_logging;
