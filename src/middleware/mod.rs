//! Entry-point adapters that open a timeout scope around a unit of work.
//!
//! # Data Flow
//! ```text
//! HTTP request → http.rs (resolve budget from config / provider / request head)
//!     → timeout_async scope → inner service
//!
//! Job payload → job.rs (read budget from payload key)
//!     → timeout / timeout_async scope → job body
//! ```

pub mod http;
pub mod job;

pub use http::{RequestTimeout, RequestTimeoutLayer};
pub use job::JobTimeout;
