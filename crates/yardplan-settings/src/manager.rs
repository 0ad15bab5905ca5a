//! Locating, loading and saving the configuration file.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{SettingsError, SettingsResult};

const APP_DIR: &str = "yardplan";
const CONFIG_FILE: &str = "config.toml";

/// Owns the active configuration and the file it came from.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    config: Config,
    path: PathBuf,
}

impl SettingsManager {
    /// Platform configuration directory for the application.
    pub fn config_dir() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR))
            .ok_or(SettingsError::NoConfigDirectory)
    }

    pub fn default_config_path() -> SettingsResult<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    /// A file that exists but cannot be parsed or validated is an error.
    pub fn load(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref().to_path_buf();
        let config = if path.exists() {
            let config = Config::load_from_file(&path)?;
            tracing::info!("Loaded settings from {}", path.display());
            config
        } else {
            tracing::info!("No settings at {}, using defaults", path.display());
            Config::default()
        };
        Ok(Self { config, path })
    }

    /// [`load`](Self::load) from the platform default location.
    pub fn load_default() -> SettingsResult<Self> {
        Self::load(Self::default_config_path()?)
    }

    pub fn save(&self) -> SettingsResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::io(parent, e))?;
        }
        self.config.save_to_file(&self.path)?;
        tracing::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
