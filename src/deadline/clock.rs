//! Monotonic clock source.
//!
//! All deadline math goes through [`now`]. It reads tokio's clock, which is the
//! OS monotonic clock unless a test runtime has paused time, in which case it
//! follows the virtual clock.

pub use tokio::time::Instant;

/// Current monotonic time.
#[inline]
pub fn now() -> Instant {
    Instant::now()
}
