//! Structured logging with tracing

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Error raised when the global subscriber cannot be installed.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    #[error("failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. `config.format` selects
/// JSON lines (`json`) or human readable output (`pretty`).
pub fn init_tracing(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| LoggingError::InvalidFilter {
            filter: config.level.clone(),
            message: e.to_string(),
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if config.format == "pretty" {
        builder.pretty().try_init()
    } else {
        builder.json().flatten_event(true).try_init()
    };

    result.map_err(|e| LoggingError::Init(e.to_string()))
}
