//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::models::*;
use super::Result;

/// Builder for creating [`RollConfig`] instances.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: RollConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use in-memory storage (the default, and what the test suite uses).
    pub fn with_memory_storage(mut self) -> Self {
        self.config.storage.backend = StorageBackend::Memory;
        self
    }

    /// Set the minimum log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log output format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Set how far back the feed window reaches.
    pub fn with_feed_window_days(mut self, days: u32) -> Self {
        self.config.feed.window_days = days;
        self
    }

    /// Set the concurrency cap for detail-hydration lookups.
    pub fn with_hydration_concurrency(mut self, concurrency: usize) -> Self {
        self.config.feed.hydration_concurrency = concurrency;
        self
    }

    /// Set how many photo uploads may be in flight at once.
    pub fn with_upload_concurrency(mut self, concurrency: usize) -> Self {
        self.config.uploads.concurrency = concurrency;
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<RollConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
