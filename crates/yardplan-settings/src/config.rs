//! Configuration for YardPlan
//!
//! Supports JSON and TOML file formats, chosen by file extension.
//!
//! Configuration is organized into logical sections:
//! - Site location (drives the sun position)
//! - Canvas preferences (grid, canvas size, default lot)
//! - Asset locations (model directory, plant catalog override)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsError, SettingsResult};
use yardplan_core::constants::{
    DEFAULT_CANVAS_HEIGHT_PX, DEFAULT_CANVAS_WIDTH_PX, DEFAULT_LATITUDE, DEFAULT_LONGITUDE,
    DEFAULT_LOT_DEPTH_FT, DEFAULT_LOT_WIDTH_FT,
};

/// Geographic location of the yard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Degrees, north positive
    pub latitude: f64,
    /// Degrees, east positive
    pub longitude: f64,
    /// Local time offset from UTC in hours
    pub utc_offset_hours: f64,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            utc_offset_hours: -5.0,
        }
    }
}

/// 2D canvas preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub show_grid: bool,
    /// Lot width for new designs, feet
    pub default_lot_width: f64,
    /// Lot depth for new designs, feet
    pub default_lot_depth: f64,
    pub width_px: u32,
    pub height_px: u32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            default_lot_width: DEFAULT_LOT_WIDTH_FT,
            default_lot_depth: DEFAULT_LOT_DEPTH_FT,
            width_px: DEFAULT_CANVAS_WIDTH_PX as u32,
            height_px: DEFAULT_CANVAS_HEIGHT_PX as u32,
        }
    }
}

/// Where models and catalogs live
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Directory holding `<species>_<season>.stl` models
    pub model_dir: Option<PathBuf>,
    /// JSON plant catalog replacing the built-in one
    pub catalog_path: Option<PathBuf>,
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Most recent first
    pub recent_files: Vec<PathBuf>,
    pub recent_files_count: usize,
    pub site: SiteSettings,
    pub canvas: CanvasSettings,
    pub assets: AssetSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recent_files: Vec::new(),
            recent_files_count: 10,
            site: SiteSettings::default(),
            canvas: CanvasSettings::default(),
            assets: AssetSettings::default(),
        }
    }
}

enum Format {
    Json,
    Toml,
}

fn format_for(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_for(path)?;
        let content =
            std::fs::read_to_string(path).map_err(|e| SettingsError::io(path, e))?;
        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match format_for(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };
        std::fs::write(path, content).map_err(|e| SettingsError::io(path, e))?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let site = &self.site;
        if !(-90.0..=90.0).contains(&site.latitude) {
            return Err(ConfigError::out_of_range("site.latitude", site.latitude));
        }
        if !(-180.0..=180.0).contains(&site.longitude) {
            return Err(ConfigError::out_of_range("site.longitude", site.longitude));
        }
        if !(-14.0..=14.0).contains(&site.utc_offset_hours) {
            return Err(ConfigError::out_of_range(
                "site.utc_offset_hours",
                site.utc_offset_hours,
            ));
        }

        let canvas = &self.canvas;
        if !(canvas.default_lot_width > 0.0 && canvas.default_lot_depth > 0.0) {
            return Err(ConfigError::out_of_range(
                "canvas.default_lot_size",
                format!("{}x{}", canvas.default_lot_width, canvas.default_lot_depth),
            ));
        }
        if canvas.width_px == 0 || canvas.height_px == 0 {
            return Err(ConfigError::out_of_range(
                "canvas.size",
                format!("{}x{}", canvas.width_px, canvas.height_px),
            ));
        }
        Ok(())
    }

    /// Add file to recent files list
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|f| f != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(self.recent_files_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_latitude_out_of_range() {
        let mut config = Config::default();
        config.site.latitude = 95.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValueOutOfRange { key, .. }) if key == "site.latitude"
        ));
    }

    #[test]
    fn test_recent_files_dedup_and_trim() {
        let mut config = Config {
            recent_files_count: 2,
            ..Config::default()
        };
        config.add_recent_file(PathBuf::from("a.json"));
        config.add_recent_file(PathBuf::from("b.json"));
        config.add_recent_file(PathBuf::from("a.json"));
        config.add_recent_file(PathBuf::from("c.json"));
        assert_eq!(
            config.recent_files,
            vec![PathBuf::from("c.json"), PathBuf::from("a.json")]
        );
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[site]\nlatitude = 51.5\n").unwrap();
        assert_eq!(config.site.latitude, 51.5);
        assert_eq!(config.site.longitude, DEFAULT_LONGITUDE);
        assert!(config.canvas.show_grid);
    }
}
