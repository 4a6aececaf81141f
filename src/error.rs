//! Error types shared across subsystems.

use std::time::Duration;
use thiserror::Error;

/// Signaled by [`check_deadline`](crate::check_deadline) once the active
/// deadline has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("request deadline exceeded after {:.3}s", .elapsed.as_secs_f64())]
pub struct TimeoutExceeded {
    /// Time spent in the innermost scope when the check fired.
    pub elapsed: Duration,
}

impl TimeoutExceeded {
    pub fn new(elapsed: Duration) -> Self {
        Self { elapsed }
    }
}

/// Errors raised while installing interception layers.
///
/// These are startup errors; nothing at request time is expected to catch them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    /// An interception layer with this identity is already installed.
    #[error("cannot install duplicate interception layer `{identity}` on {target}")]
    DuplicateIdentity { identity: String, target: &'static str },

    /// No operations were named for the layer.
    #[error("no operations specified for interception layer `{identity}` on {target}")]
    NoOperations { identity: String, target: &'static str },

    /// A named operation is not part of the target's operation surface.
    #[error("{target} has no operation `{operation}`")]
    UnknownOperation { target: &'static str, operation: String },
}
