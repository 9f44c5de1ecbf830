//! Configuration manager implementation

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use tracing::debug;

use crate::{
    error::Result,
    types::{AppConfig, ConfigStore},
};

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "stencil.toml";
/// Prefix of environment overrides, e.g. `STENCIL_TOKENS__START`
pub const ENV_PREFIX: &str = "STENCIL";

/// Configuration manager
pub struct ConfigManager {
    /// Configuration file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigManager {
    /// Create a manager for `./stencil.toml`
    pub fn new() -> Self {
        Self::with_path(PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Create with custom config path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Use a different environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load, then validate
    pub fn load(&self) -> Result<AppConfig> {
        let config = self.load_config()?;
        self.validate_config(&config)?;
        Ok(config)
    }

    /// Save to the configuration file
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        self.save_config(config)
    }
}

impl ConfigStore for ConfigManager {
    fn load_config(&self) -> Result<AppConfig> {
        debug!(path = %self.config_path.display(), "Loading configuration");

        let builder = Config::builder()
            .add_source(
                File::from(self.config_path.clone())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;
        Ok(app_config)
    }

    fn save_config(&self, config: &AppConfig) -> Result<()> {
        let toml = toml::to_string(config)?;
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.config_path, toml)?;
        debug!(path = %self.config_path.display(), "Saved configuration");
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path() {
        let manager = ConfigManager::new();
        assert_eq!(manager.config_path(), Path::new(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("absent.toml"))
            .with_env_prefix("STENCIL_UNIT_MISSING");

        assert_eq!(manager.load().unwrap(), AppConfig::default());
    }
}
