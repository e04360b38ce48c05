//! Integration tests for loading and saving style configs on disk

use std::path::PathBuf;
use tempfile::TempDir;
use upsview_settings::{Rgba, SettingsError, StyleConfig};

fn customised() -> StyleConfig {
    let mut config = StyleConfig::default();
    config.palette.selected = Rgba::rgb(255, 87, 34);
    config.fonts.label.size = 22.0;
    config.charge_bar.glyphs = "=====".to_string();
    config.images.connector = PathBuf::from("/opt/icons/iec_c14.png");
    config
}

#[test]
fn test_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("style.toml");

    let config = customised();
    config.save_to_file(&path).unwrap();

    let loaded = StyleConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("style.json");

    let config = customised();
    config.save_to_file(&path).unwrap();

    let loaded = StyleConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deeper").join("style.toml");

    StyleConfig::default().save_to_file(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_save_rejects_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("style.ini");

    let err = StyleConfig::default().save_to_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::UnsupportedFormat(_)));
    assert!(!path.exists());
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("style.json");
    std::fs::write(&path, r#"{"charge_bar": {"glyphs": ""}}"#).unwrap();

    let err = StyleConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidSetting { .. }));
}

#[test]
fn test_load_rejects_bad_color() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("style.toml");
    std::fs::write(&path, "[palette]\nselected = \"blue\"\n").unwrap();

    let err = StyleConfig::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::TomlError(_)));
}
