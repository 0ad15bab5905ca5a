use std::path::PathBuf;

use yardplan_settings::{Config, ConfigError, SettingsError, SettingsManager};

#[test]
fn toml_and_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.site.latitude = 47.6;
    config.site.longitude = -122.3;
    config.assets.model_dir = Some(PathBuf::from("/opt/yardplan/models"));
    config.add_recent_file(PathBuf::from("backyard.json"));

    for name in ["config.toml", "config.json"] {
        let path = dir.path().join(name);
        config.save_to_file(&path).unwrap();
        assert_eq!(Config::load_from_file(&path).unwrap(), config);
    }
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let err = Config::default().save_to_file(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Config(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"
    ));
}

#[test]
fn invalid_values_fail_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[site]\nlongitude = 200.0\n").unwrap();
    assert!(matches!(
        SettingsManager::load(&path),
        Err(SettingsError::Config(ConfigError::ValueOutOfRange { .. }))
    ));
}

#[test]
fn manager_defaults_when_missing_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let mut manager = SettingsManager::load(&path).unwrap();
    assert_eq!(manager.config(), &Config::default());

    manager.config_mut().canvas.show_grid = false;
    manager.save().unwrap();
    let reloaded = SettingsManager::load(&path).unwrap();
    assert!(!reloaded.config().canvas.show_grid);
}
