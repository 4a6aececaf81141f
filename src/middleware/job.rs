//! Background job adapter.
//!
//! A job carries its own budget in its payload under `request_timeout`
//! (seconds, integer or float). Jobs without the key fall back to the
//! configured default, which is unlimited unless set.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use crate::config::JobsConfig;
use crate::deadline::{secs_f64, timeout, timeout_async};

pub const DEFAULT_PAYLOAD_KEY: &str = "request_timeout";

#[derive(Debug, Clone, PartialEq)]
pub struct JobTimeout {
    key: String,
    default: Option<Duration>,
}

impl JobTimeout {
    pub fn new() -> Self {
        Self {
            key: DEFAULT_PAYLOAD_KEY.to_string(),
            default: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_default(mut self, default: Option<Duration>) -> Self {
        self.default = default;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Budget for a job with this payload. Non-numeric and non-positive values
    /// are unlimited.
    pub fn budget(&self, payload: &Value) -> Option<Duration> {
        match payload.get(&self.key) {
            Some(value) => value.as_f64().and_then(secs_f64),
            None => self.default,
        }
    }

    /// Run a synchronous job body inside its budget.
    pub fn around<R>(&self, payload: &Value, f: impl FnOnce() -> R) -> R {
        let budget = self.budget(payload);
        tracing::debug!(budget = ?budget, "Job timeout scope");
        timeout(budget, f)
    }

    /// Run an async job body inside its budget.
    pub fn around_async<F: Future>(&self, payload: &Value, job: F) -> impl Future<Output = F::Output> {
        let budget = self.budget(payload);
        tracing::debug!(budget = ?budget, "Job timeout scope");
        timeout_async(budget, job)
    }
}

impl Default for JobTimeout {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&JobsConfig> for JobTimeout {
    fn from(config: &JobsConfig) -> Self {
        Self::new()
            .with_key(config.payload_key.clone())
            .with_default(config.default_timeout_secs.and_then(secs_f64))
    }
}
