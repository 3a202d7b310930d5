// SPDX-License-Identifier: MIT OR Apache-2.0

//! Menu configuration errors.

use crate::shortcut::KeyComboParseError;
use thiserror::Error;

/// Errors detected while deriving data from a [MenuConfig](super::MenuConfig).
///
/// These never stop the menu bar from rendering or navigating; they only
/// disable the affected hotkeys and are reported to the embedding application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Two different actions normalize to the same key combination.
    #[error("Duplicate hotkey {combo}: bound to both '{first}' and '{second}'")]
    DuplicateHotkey {
        /// Normalized combination, e.g. `ctrl+s`.
        combo: String,
        /// Label of the action seen first in pre-order.
        first: String,
        /// Label of the colliding action.
        second: String,
    },

    /// A shortcut string could not be parsed.
    #[error("Invalid shortcut '{shortcut}' on '{label}': {source}")]
    InvalidShortcut {
        /// Label of the action.
        label: String,
        /// The shortcut as written.
        shortcut: String,
        /// Parse failure.
        source: KeyComboParseError,
    },
}

impl ConfigError {
    /// Returns `true` for [ConfigError::DuplicateHotkey].
    pub fn is_duplicate_hotkey(&self) -> bool {
        matches!(self, ConfigError::DuplicateHotkey { .. })
    }
}
