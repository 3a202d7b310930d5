// SPDX-License-Identifier: MIT OR Apache-2.0
//! Settings services for menubar => See `menubar` crate.

pub mod settings;

// Re-export commonly used types from settings
pub use settings::{MenuBarSettings, SettingsError, SettingsFile, SettingsRegistry, ThemeSetting};
