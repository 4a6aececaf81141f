//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::DeadlineConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DeadlineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<DeadlineConfig, ConfigError> {
    let config: DeadlineConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let config = parse_config("").unwrap();
        assert_eq!(config.jobs.payload_key, "request_timeout");
        assert_eq!(config.http.timeout_secs, None);
    }

    #[test]
    fn test_parse_full() {
        let config = parse_config(
            r#"
            [http]
            timeout_secs = 2.5

            [jobs]
            payload_key = "budget"
            default_timeout_secs = 30

            [hooks]
            database = false
            strict = true

            [logging]
            filter = "request_deadline=debug"
            format = "compact"

            [server]
            bind_address = "127.0.0.1:4000"
            "#,
        )
        .unwrap();

        assert_eq!(config.http.timeout_secs, Some(2.5));
        assert_eq!(config.jobs.default_timeout_secs, Some(30.0));
        assert!(!config.hooks.database);
        assert!(config.hooks.strict);
        assert_eq!(config.logging.format, crate::config::LogFormat::Compact);
        assert_eq!(config.server.bind_address, "127.0.0.1:4000");
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[http]\ntimeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_every_problem() {
        let err = parse_config("[http]\ntimeout_secs = -1\n[jobs]\npayload_key = \"\"").unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/deadline.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
