//! Structured logging setup.
//!
//! The library only emits `tracing` events; the subscriber is installed
//! here, by the binary. Results go to stdout, diagnostics to stderr.

use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off.
    pub level: String,
    /// Output format: text or json.
    pub format: String,
    /// Colored output (text format only).
    pub color: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            color: true,
        }
    }
}

/// Install the global tracing subscriber.
///
/// The `BLOCKTREE_LOG` environment variable overrides the configured level
/// and accepts full `EnvFilter` directives.
pub fn init_logging(config: &LoggingConfig) -> Result<(), IndexError> {
    let filter = match EnvFilter::try_from_env("BLOCKTREE_LOG") {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| IndexError::Config(format!("invalid log level {:?}: {e}", config.level)))?,
    };

    let base = Registry::default().with(filter);
    match config.format.as_str() {
        "json" => base
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        "text" => base
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .init(),
        other => {
            return Err(IndexError::Config(format!("unknown log format {other:?}")));
        }
    }
    Ok(())
}
