//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts finite and non-negative)
//! - Check the bind address parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DeadlineConfig → Result<(), Vec<ValidationError>>
//! - A zero timeout is accepted and means unlimited

use std::net::SocketAddr;

use crate::config::schema::DeadlineConfig;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &DeadlineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_timeout(&mut errors, "http.timeout_secs", config.http.timeout_secs);
    check_timeout(&mut errors, "jobs.default_timeout_secs", config.jobs.default_timeout_secs);

    if config.jobs.payload_key.trim().is_empty() {
        errors.push(ValidationError::new("jobs.payload_key", "must not be empty"));
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("invalid socket address '{}'", config.server.bind_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_timeout(errors: &mut Vec<ValidationError>, field: &'static str, value: Option<f64>) {
    match value {
        Some(secs) if !secs.is_finite() => errors.push(ValidationError::new(field, "must be finite")),
        Some(secs) if secs < 0.0 => errors.push(ValidationError::new(field, "must not be negative")),
        _ => {}
    }
}
