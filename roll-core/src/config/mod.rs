//! Configuration system for the Roll core.
//!
//! Configuration can be assembled programmatically through [`ConfigBuilder`]
//! or loaded from a `roll.toml` file and `ROLL_*` environment variables
//! through [`ConfigLoader`], with validation applied in both paths.

mod builder;
mod loader;
mod models;
#[cfg(test)]
mod tests;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;

/// Default configuration file name the loader looks for
pub const DEFAULT_CONFIG_FILE: &str = "roll.toml";

/// Environment variable prefix for Roll configuration
pub const ENV_PREFIX: &str = "ROLL_";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file or environment loading
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
