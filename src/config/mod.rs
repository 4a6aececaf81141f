//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DeadlineConfig (validated, immutable)
//!     → middleware constructors, hook setup, logging
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{DeadlineConfig, HooksConfig, HttpConfig, JobsConfig, LogFormat, LoggingConfig, ServerConfig};
pub use validation::{validate_config, ValidationError};
