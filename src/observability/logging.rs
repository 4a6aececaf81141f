//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Configure log level from config and environment
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides the configured filter when set
//! - Full format by default, compact for development

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber. Fails if one is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::new(directives(config, env.as_deref()));

    let fmt_layer = match config.format {
        LogFormat::Full => fmt::layer().boxed(),
        LogFormat::Compact => fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry().with(filter).with(fmt_layer).try_init()
}

fn directives<'a>(config: &'a LoggingConfig, env: Option<&'a str>) -> &'a str {
    match env {
        Some(env) if !env.trim().is_empty() => env,
        _ => &config.filter,
    }
}

/// Run `f` with a thread-scoped subscriber and return what it logged.
#[cfg(test)]
pub(crate) fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logged = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logged)
}
