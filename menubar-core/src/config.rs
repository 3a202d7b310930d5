// SPDX-License-Identifier: MIT OR Apache-2.0
//! Menu bar behaviour options.

/// Behaviour switches for a [MenuBar](crate::menu::MenuBar).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuBarOptions {
    /// Open a menu when the pointer enters its trigger while the bar is
    /// closed. Off by default: hover only switches between menus once one
    /// is open.
    pub hover_opens_from_closed: bool,
    /// Fire action shortcuts at all.
    pub hotkeys_enabled: bool,
    /// Close the open cascade after a hotkey fires an action.
    pub close_on_hotkey: bool,
}

impl Default for MenuBarOptions {
    fn default() -> Self {
        Self {
            hover_opens_from_closed: false,
            hotkeys_enabled: true,
            close_on_hotkey: true,
        }
    }
}

impl MenuBarOptions {
    /// Options with every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set [MenuBarOptions::hover_opens_from_closed].
    pub fn with_hover_opens_from_closed(mut self, enabled: bool) -> Self {
        self.hover_opens_from_closed = enabled;
        self
    }

    /// Set [MenuBarOptions::hotkeys_enabled].
    pub fn with_hotkeys_enabled(mut self, enabled: bool) -> Self {
        self.hotkeys_enabled = enabled;
        self
    }

    /// Set [MenuBarOptions::close_on_hotkey].
    pub fn with_close_on_hotkey(mut self, enabled: bool) -> Self {
        self.close_on_hotkey = enabled;
        self
    }
}
