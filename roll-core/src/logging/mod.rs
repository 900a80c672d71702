//! Structured logging infrastructure.
//!
//! Builds a `tracing-subscriber` fmt subscriber from [`LoggingConfig`].
//! Initialization is idempotent: installing over an existing global
//! subscriber is not an error.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LogLevel, LoggingConfig};

/// Error type for logging operations
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Error in subscriber setup
    #[error("Failed to install subscriber: {0}")]
    Subscriber(String),
}

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, LogError>;

fn to_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// Initialize the logging system with the given configuration.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let level = to_level(config.level);

    let result = if config.env_filter {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
        init_with_filter(config.format, filter)
    } else {
        init_with_filter(config.format, EnvFilter::new(level.to_string()))
    };

    // A previously installed subscriber wins; double-init is tolerated.
    match result {
        Err(LogError::Subscriber(ref msg)) if msg.contains("already") => Ok(()),
        other => other,
    }
}

fn init_with_filter(format: LogFormat, filter: EnvFilter) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .with_target(true);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    result.map_err(|e| LogError::Subscriber(e.to_string()))
}
