//! Configuration loading from files and the environment.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;

use super::models::RollConfig;
use super::{ConfigError, Result, DEFAULT_CONFIG_FILE, ENV_PREFIX};

/// Loads configuration by layering defaults, an optional TOML file and
/// `ROLL_*` environment variables (highest precedence).
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<std::path::PathBuf>,
}

impl ConfigLoader {
    /// Create a loader that reads `roll.toml` from the working directory
    /// when it exists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from a specific file instead.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load and validate the configuration.
    pub fn load(&self) -> Result<RollConfig> {
        let mut figment = Figment::from(Serialized::defaults(RollConfig::default()));

        match &self.file {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE)),
        }

        let config: RollConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }
}
