//! Configuration model definitions.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};

/// Main configuration structure for the Roll core.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RollConfig {
    /// Storage configuration
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Feed configuration
    pub feed: FeedConfig,

    /// Photo upload configuration
    pub uploads: UploadConfig,
}

impl RollConfig {
    /// Validate the whole configuration.
    pub fn validate(&self) -> Result<()> {
        self.feed.validate()?;
        self.uploads.validate()?;
        Ok(())
    }
}

/// Which store backend to create.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process store, also used by the test suite
    #[default]
    Memory,
}

/// Configuration for the document store.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Store backend to use
    pub backend: StorageBackend,
}

/// Log verbosity levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

/// Log output formats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Compact
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level to emit
    pub level: LogLevel,

    /// Output format
    pub format: LogFormat,

    /// Whether to honor a `RUST_LOG`-style env filter over `level`
    pub env_filter: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            env_filter: true,
        }
    }
}

/// Configuration for the post feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// How far back the feed window reaches, in days
    pub window_days: u32,

    /// Concurrency cap for poster-detail hydration lookups
    pub hydration_concurrency: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            window_days: 7,
            hydration_concurrency: 16,
        }
    }
}

impl FeedConfig {
    /// Validate the configuration, returning an error if invalid
    pub fn validate(&self) -> Result<()> {
        if self.window_days == 0 {
            return Err(ConfigError::ValidationError(
                "feed.window_days must be greater than 0".to_string(),
            ));
        }
        if self.hydration_concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "feed.hydration_concurrency must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the batched photo uploader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// How many uploads may be in flight at once
    pub concurrency: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

impl UploadConfig {
    /// Validate the configuration, returning an error if invalid
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "uploads.concurrency must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
