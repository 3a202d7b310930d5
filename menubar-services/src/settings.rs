// SPDX-License-Identifier: MIT OR Apache-2.0
use anyhow::Result;
use menubar_core::config::MenuBarOptions;
use menubar_core::menu::{ColorTheme, RenderHints};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use xdg::BaseDirectories;

/// XDG prefix under which settings files are looked up.
pub const XDG_PREFIX: &str = "menubar";

/// Name of the settings file.
pub const SETTINGS_FILE: &str = "menubar.toml";

/// Environment variable naming an extra settings file, applied last.
pub const SETTINGS_ENV: &str = "MENUBAR_CONFIG";

/// Errors raised while reading a single settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The file could not be read.
    #[error("Failed to read settings file {path:?}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid settings TOML.
    #[error("Failed to parse settings from {origin}: {source}")]
    Parse {
        /// File path or other description of the input.
        origin: String,
        /// Underlying error.
        source: toml::de::Error,
    },
}

/// Colour theme as written in a settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeSetting {
    /// `light`
    Light,
    /// `dark`
    Dark,
}

impl From<ThemeSetting> for ColorTheme {
    fn from(theme: ThemeSetting) -> Self {
        match theme {
            ThemeSetting::Light => ColorTheme::Light,
            ThemeSetting::Dark => ColorTheme::Dark,
        }
    }
}

/// On-disk layout of a settings file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsFile {
    /// The `[menubar]` section.
    #[serde(default)]
    pub menubar: MenuBarSection,
    /// Any other sections are captured here
    #[serde(flatten)]
    pub other: HashMap<String, toml::Value>,
}

/// The `[menubar]` section. Absent keys leave earlier layers untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuBarSection {
    /// Hovering a top-level trigger opens its menu while closed.
    pub hover_opens_from_closed: Option<bool>,
    /// Register and fire keyboard shortcuts.
    pub hotkeys_enabled: Option<bool>,
    /// Close the open cascade after a hotkey runs.
    pub close_on_hotkey: Option<bool>,
    /// Colour theme hint for the renderer.
    pub color_theme: Option<ThemeSetting>,
    /// Ask the renderer to skip ripple effects.
    pub disable_ripple: Option<bool>,
    /// Popup transition length in milliseconds.
    pub transition_duration_ms: Option<u64>,
}

impl SettingsFile {
    /// Parse settings TOML.
    pub fn from_toml(content: &str, origin: impl Into<String>) -> std::result::Result<Self, SettingsError> {
        toml::from_str(content).map_err(|source| SettingsError::Parse {
            origin: origin.into(),
            source,
        })
    }
}

/// Fully resolved menu bar settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuBarSettings {
    /// Behaviour switches.
    pub options: MenuBarOptions,
    /// Presentation hints for the renderer.
    pub hints: RenderHints,
}

/// Registry for managing menu bar settings.
pub struct SettingsRegistry {
    settings: MenuBarSettings,
    other: HashMap<String, toml::Value>,
    loaded: Vec<PathBuf>,
}

impl Default for SettingsRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SettingsRegistry {
    /// Create a registry holding only the built-in defaults.
    pub fn with_defaults() -> Self {
        Self {
            settings: MenuBarSettings::default(),
            other: HashMap::new(),
            loaded: Vec::new(),
        }
    }

    /// Create a new SettingsRegistry and load settings from standard locations.
    pub fn new() -> Result<Self> {
        let mut registry = Self::with_defaults();
        registry.load()?;
        Ok(registry)
    }

    /// Load settings from standard locations in precedence order.
    ///
    /// Order (later overrides earlier):
    /// 1. System Data: /usr/share/menubar/menubar.toml (and XDG_DATA_DIRS)
    /// 2. System Config: /etc/xdg/menubar/menubar.toml (and XDG_CONFIG_DIRS)
    /// 3. User Config: ~/.config/menubar/menubar.toml (XDG_CONFIG_HOME)
    /// 4. The file named by `MENUBAR_CONFIG`, if set
    ///
    /// A file that cannot be read or parsed is logged and skipped.
    pub fn load(&mut self) -> Result<()> {
        let xdg_dirs = BaseDirectories::with_prefix(XDG_PREFIX)?;

        for path in xdg_dirs.find_data_files(SETTINGS_FILE).rev() {
            self.load_file(&path);
        }
        for path in xdg_dirs.find_config_files(SETTINGS_FILE).rev() {
            self.load_file(&path);
        }
        let user_config_path = xdg_dirs.get_config_home().join(SETTINGS_FILE);
        if user_config_path.exists() && !self.loaded.contains(&user_config_path) {
            self.load_file(&user_config_path);
        }

        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            self.load_file(Path::new(&path));
        }
        Ok(())
    }

    fn load_file(&mut self, path: &Path) {
        log::info!("Loading menubar settings from: {:?}", path);
        if let Err(e) = self.try_load_file(path) {
            match e {
                SettingsError::Read { .. } => log::warn!("{}", e),
                SettingsError::Parse { .. } => log::error!("{}", e),
            }
        }
    }

    /// Read, parse and merge one settings file.
    pub fn try_load_file(&mut self, path: &Path) -> std::result::Result<(), SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file = SettingsFile::from_toml(&content, path.display().to_string())?;
        self.merge(file);
        self.loaded.push(path.to_path_buf());
        Ok(())
    }

    /// Parse settings TOML and merge it on top of the current settings.
    pub fn load_str(&mut self, content: &str) -> std::result::Result<(), SettingsError> {
        let file = SettingsFile::from_toml(content, "<string>")?;
        self.merge(file);
        Ok(())
    }

    /// Load settings from multiple custom paths, in order.
    pub fn load_from_paths(&mut self, paths: Vec<PathBuf>) -> Vec<Result<()>> {
        paths
            .into_iter()
            .map(|path| self.try_load_file(&path).map_err(anyhow::Error::from))
            .collect()
    }

    /// Merge a loaded file into the current settings.
    fn merge(&mut self, other: SettingsFile) {
        let section = other.menubar;
        let options = &mut self.settings.options;
        if let Some(hover) = section.hover_opens_from_closed {
            options.hover_opens_from_closed = hover;
        }
        if let Some(enabled) = section.hotkeys_enabled {
            options.hotkeys_enabled = enabled;
        }
        if let Some(close) = section.close_on_hotkey {
            options.close_on_hotkey = close;
        }

        let hints = &mut self.settings.hints;
        if let Some(theme) = section.color_theme {
            hints.color_theme = theme.into();
        }
        if let Some(disable) = section.disable_ripple {
            hints.disable_ripple = disable;
        }
        if let Some(ms) = section.transition_duration_ms {
            hints.transition_duration = Duration::from_millis(ms);
        }

        // Other
        self.other.extend(other.other);
    }

    /// Get the current settings.
    pub fn get(&self) -> &MenuBarSettings {
        &self.settings
    }

    /// Behaviour options to build a menu bar with.
    pub fn options(&self) -> MenuBarOptions {
        self.settings.options
    }

    /// Hints to hand to the renderer.
    pub fn hints(&self) -> RenderHints {
        self.settings.hints.clone()
    }

    /// Sections other than `[menubar]`, last writer wins.
    pub fn other(&self) -> &HashMap<String, toml::Value> {
        &self.other
    }

    /// Files merged so far, in order.
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded
    }

    /// Reload settings (re-runs the full load process from defaults).
    pub fn reload(&mut self) -> Result<()> {
        *self = Self::with_defaults();
        self.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_boolean_override() {
        let mut registry = SettingsRegistry::with_defaults();
        registry
            .load_str("[menubar]\nhotkeys_enabled = false\ndisable_ripple = false\n")
            .unwrap();
        assert!(!registry.options().hotkeys_enabled);
        assert!(!registry.hints().disable_ripple);

        registry.load_str("[menubar]\nhotkeys_enabled = true\n").unwrap();
        assert!(registry.options().hotkeys_enabled, "Later layer should re-enable hotkeys");
        assert!(!registry.hints().disable_ripple, "Absent key should keep earlier value");
    }

    #[test]
    fn test_defaults_match_component_defaults() {
        let registry = SettingsRegistry::with_defaults();
        assert_eq!(registry.hints().color_theme, ColorTheme::Light);
        assert!(registry.hints().disable_ripple);
        assert_eq!(registry.hints().transition_duration, Duration::ZERO);
        assert!(!registry.options().hover_opens_from_closed);
    }

    #[test]
    fn test_theme_and_duration_parse() {
        let mut registry = SettingsRegistry::with_defaults();
        registry
            .load_str("[menubar]\ncolor_theme = \"dark\"\ntransition_duration_ms = 150\n[extra]\nkey = 1\n")
            .unwrap();
        assert_eq!(registry.hints().color_theme, ColorTheme::Dark);
        assert_eq!(registry.hints().transition_duration, Duration::from_millis(150));
        assert!(registry.other().contains_key("extra"));
    }

    #[test]
    fn test_bad_toml_is_a_parse_error() {
        let mut registry = SettingsRegistry::with_defaults();
        let err = registry.load_str("[menubar]\ncolor_theme = \"purple\"\n").unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
        assert_eq!(registry.hints().color_theme, ColorTheme::Light);
    }
}
