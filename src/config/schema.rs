//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Durations are seconds as `f64`; absent means unlimited.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeadlineConfig {
    /// HTTP entry-point budget.
    pub http: HttpConfig,

    /// Background job budget.
    pub jobs: JobsConfig,

    /// Which client adapters to install at startup.
    pub hooks: HooksConfig,

    /// Log filter and output format.
    pub logging: LoggingConfig,

    /// Demo server settings.
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request budget in seconds.
    pub timeout_secs: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Payload key holding a job's budget in seconds.
    pub payload_key: String,

    /// Budget for jobs whose payload has no such key.
    pub default_timeout_secs: Option<f64>,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            payload_key: crate::middleware::job::DEFAULT_PAYLOAD_KEY.to_string(),
            default_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HooksConfig {
    /// Install the database adapter (check queries, clear on commit).
    pub database: bool,

    /// Reject adapters naming operations the target does not declare.
    pub strict: bool,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            database: true,
            strict: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives. `RUST_LOG` takes precedence.
    pub filter: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "request_deadline=info".to_string(),
            format: LogFormat::Full,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}
