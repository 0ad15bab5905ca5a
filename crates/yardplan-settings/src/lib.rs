//! YardPlan Settings Crate
//!
//! Handles application configuration and where it is stored.

pub mod config;
pub mod error;
pub mod manager;

pub use config::{AssetSettings, CanvasSettings, Config, SiteSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
pub use manager::SettingsManager;
