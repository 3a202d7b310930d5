//! Tests for layered settings loading

use menubar_core::menu::ColorTheme;
use menubar_services::{MenuBarSettings, SettingsError, SettingsRegistry};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_later_files_override_earlier() {
    let dir = tempfile::tempdir().unwrap();
    let system = write(
        &dir,
        "system.toml",
        r#"
[menubar]
color_theme = "dark"
transition_duration_ms = 200
hover_opens_from_closed = true
"#,
    );
    let user = write(
        &dir,
        "user.toml",
        r#"
[menubar]
transition_duration_ms = 0
hover_opens_from_closed = false
"#,
    );

    let mut registry = SettingsRegistry::with_defaults();
    let results = registry.load_from_paths(vec![system.clone(), user.clone()]);
    assert!(results.iter().all(|r| r.is_ok()));

    assert_eq!(registry.hints().color_theme, ColorTheme::Dark);
    assert_eq!(registry.hints().transition_duration, Duration::ZERO);
    assert!(!registry.options().hover_opens_from_closed);
    assert_eq!(registry.loaded_files(), &[system, user][..]);
}

#[test]
fn test_broken_layer_is_reported_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(&dir, "good.toml", "[menubar]\nclose_on_hotkey = false\n");
    let bad = write(&dir, "bad.toml", "[menubar\nclose_on_hotkey = true\n");
    let missing = dir.path().join("missing.toml");

    let mut registry = SettingsRegistry::with_defaults();
    let results = registry.load_from_paths(vec![good, bad.clone(), missing.clone()]);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_err());
    assert!(!registry.options().close_on_hotkey);

    let err = registry.try_load_file(&bad).unwrap_err();
    assert!(matches!(err, SettingsError::Parse { .. }));
    let err = registry.try_load_file(&missing).unwrap_err();
    assert!(matches!(err, SettingsError::Read { .. }));
}

#[test]
fn test_file_without_menubar_section_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let other = write(&dir, "other.toml", "[general]\ndebug = true\n");

    let mut registry = SettingsRegistry::with_defaults();
    registry.try_load_file(&other).unwrap();
    assert_eq!(registry.get(), &MenuBarSettings::default());
    assert!(registry.other().contains_key("general"));
}
