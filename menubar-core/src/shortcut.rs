// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyboard shortcut infrastructure for menubar
//!
//! Key combinations are written by authors as strings such as `"Ctrl+S"` or
//! `"cmd+shift+z"` and normalized into a canonical form (`ctrl+shift+z`) so
//! that two spellings of the same chord always compare equal.

use bitflags::bitflags;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use thiserror::Error;

bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct Modifiers: u8 {
        /// Control key.
        const CONTROL = 0b0001;
        /// Alt / Option key.
        const ALT = 0b0010;
        /// Shift key.
        const SHIFT = 0b0100;
        /// Super / Command / Windows key.
        const SUPER = 0b1000;
    }
}

/// A logical key, independent of modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// A printable character, always stored lower-cased.
    Char(char),
    /// Enter / Return.
    Enter,
    /// Space bar.
    Space,
    /// Escape.
    Escape,
    /// Tab.
    Tab,
    /// Up arrow.
    ArrowUp,
    /// Down arrow.
    ArrowDown,
    /// Left arrow.
    ArrowLeft,
    /// Right arrow.
    ArrowRight,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Insert.
    Insert,
    /// Function key `F1`..=`F24`.
    F(u8),
}

impl Key {
    /// Create a character key. Letters are lower-cased.
    pub fn char(ch: char) -> Self {
        Key::Char(ch.to_ascii_lowercase())
    }

    fn name(&self) -> String {
        match self {
            Key::Char(ch) => ch.to_string(),
            Key::Enter => "enter".to_string(),
            Key::Space => "space".to_string(),
            Key::Escape => "escape".to_string(),
            Key::Tab => "tab".to_string(),
            Key::ArrowUp => "up".to_string(),
            Key::ArrowDown => "down".to_string(),
            Key::ArrowLeft => "left".to_string(),
            Key::ArrowRight => "right".to_string(),
            Key::Home => "home".to_string(),
            Key::End => "end".to_string(),
            Key::PageUp => "pageup".to_string(),
            Key::PageDown => "pagedown".to_string(),
            Key::Backspace => "backspace".to_string(),
            Key::Delete => "delete".to_string(),
            Key::Insert => "insert".to_string(),
            Key::F(n) => format!("f{}", n),
        }
    }
}

/// Parse a single key name (case-insensitive).
fn parse_key(part: &str) -> Result<Key, KeyComboParseError> {
    let lower = part.to_lowercase();
    let key = match lower.as_str() {
        "enter" | "return" => Key::Enter,
        "space" | " " => Key::Space,
        "esc" | "escape" => Key::Escape,
        "tab" => Key::Tab,
        "up" | "arrowup" => Key::ArrowUp,
        "down" | "arrowdown" => Key::ArrowDown,
        "left" | "arrowleft" => Key::ArrowLeft,
        "right" | "arrowright" => Key::ArrowRight,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" | "pgup" => Key::PageUp,
        "pagedown" | "pgdn" => Key::PageDown,
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "insert" | "ins" => Key::Insert,
        "plus" => Key::Char('+'),
        _ => {
            let mut chars = lower.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Key::Char(ch),
                (Some('f'), Some(_)) => match lower[1..].parse::<u8>() {
                    Ok(n) if (1..=24).contains(&n) => Key::F(n),
                    _ => return Err(KeyComboParseError::UnknownKey(part.to_string())),
                },
                _ => return Err(KeyComboParseError::UnknownKey(part.to_string())),
            }
        },
    };
    Ok(key)
}

/// Error type for parsing key combinations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyComboParseError {
    /// The string is empty.
    #[error("empty key combination")]
    Empty,
    /// Only modifiers were given.
    #[error("no key specified (only modifiers)")]
    NoKey,
    /// A key name was not recognized.
    #[error("unknown key: {0}")]
    UnknownKey(String),
    /// More than one non-modifier key was given.
    #[error("more than one key in combination: {0}")]
    MultipleKeys(String),
}

/// A keyboard shortcut consisting of a key and modifier keys.
///
/// The [Display](fmt::Display) form is the normalized combination string used
/// as the hotkey table key, e.g. `ctrl+shift+s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCombo {
    /// Modifier keys that must be pressed.
    pub modifiers: Modifiers,
    /// The key.
    pub key: Key,
}

impl KeyCombo {
    /// Create a new key combination.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        let key = match key {
            Key::Char(ch) => Key::char(ch),
            other => other,
        };
        Self { modifiers, key }
    }

    /// A key without modifiers.
    pub fn key_only(key: Key) -> Self {
        Self::new(key, Modifiers::empty())
    }

    /// Create a combination with the Ctrl modifier.
    pub fn ctrl(key: Key) -> Self {
        Self::new(key, Modifiers::CONTROL)
    }

    /// Create a combination with Ctrl+Shift modifiers.
    pub fn ctrl_shift(key: Key) -> Self {
        Self::new(key, Modifiers::CONTROL | Modifiers::SHIFT)
    }

    /// Create a combination with the Alt modifier.
    pub fn alt(key: Key) -> Self {
        Self::new(key, Modifiers::ALT)
    }

    /// Whether this is an unmodified key that drives menu navigation.
    ///
    /// While a menu is open these keys belong to the navigation resolver and
    /// never fire hotkeys.
    pub fn is_navigation(&self) -> bool {
        self.modifiers.is_empty()
            && matches!(
                self.key,
                Key::ArrowUp
                    | Key::ArrowDown
                    | Key::ArrowLeft
                    | Key::ArrowRight
                    | Key::Enter
                    | Key::Space
                    | Key::Escape
                    | Key::Home
                    | Key::End
            )
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(Modifiers::CONTROL) {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.contains(Modifiers::ALT) {
            f.write_str("alt+")?;
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            f.write_str("shift+")?;
        }
        if self.modifiers.contains(Modifiers::SUPER) {
            f.write_str("super+")?;
        }
        f.write_str(&self.key.name())
    }
}

impl FromStr for KeyCombo {
    type Err = KeyComboParseError;

    /// Parse a combination like `"Ctrl+S"`, `"alt+F4"` or `"Cmd+Shift+Z"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyComboParseError::Empty);
        }

        let mut modifiers = Modifiers::empty();
        let mut key: Option<Key> = None;

        // "ctrl++" and "+" spell the plus key
        let body = if s == "+" {
            key = Some(Key::Char('+'));
            ""
        } else if let Some(rest) = s.strip_suffix("++") {
            key = Some(Key::Char('+'));
            rest
        } else {
            s
        };

        for part in body.split('+').filter(|part| !body.is_empty() || !part.is_empty()) {
            let part = part.trim();
            if part.is_empty() {
                return Err(KeyComboParseError::UnknownKey(s.to_string()));
            }
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
                "alt" | "option" => modifiers |= Modifiers::ALT,
                "shift" => modifiers |= Modifiers::SHIFT,
                "super" | "meta" | "cmd" | "command" | "win" | "windows" => {
                    modifiers |= Modifiers::SUPER
                },
                _ => {
                    if key.is_some() {
                        return Err(KeyComboParseError::MultipleKeys(s.to_string()));
                    }
                    key = Some(parse_key(part)?);
                },
            }
        }

        match key {
            Some(key) => Ok(KeyCombo::new(key, modifiers)),
            None => Err(KeyComboParseError::NoKey),
        }
    }
}

/// A raw key press as delivered by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The pressed key.
    pub key: Key,
    /// Modifier state at the time of the press.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a new key event.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Normalize the event into the same form shortcuts are stored in.
    pub fn combo(&self) -> KeyCombo {
        KeyCombo::new(self.key, self.modifiers)
    }
}

/// What happened to a key event after it was offered to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The event was handled; default handling must be suppressed.
    Consumed,
    /// Nothing matched; the event continues untouched.
    PassThrough,
}

impl KeyDisposition {
    /// Returns `true` if the event was consumed.
    pub fn is_consumed(self) -> bool {
        self == KeyDisposition::Consumed
    }
}

/// Callback bound to a global key combination.
///
/// Returns `true` if it handled the press.
pub type HotkeyCallback = Arc<dyn Fn() -> bool + Send + Sync>;

/// A global key listener the menu bar registers its hotkeys with.
pub trait KeyListener {
    /// Bind `callback` to `combo`, replacing any previous binding.
    fn register(&mut self, combo: KeyCombo, callback: HotkeyCallback);

    /// Remove the binding for `combo`. Unknown combos are ignored.
    fn unregister(&mut self, combo: &KeyCombo);
}

/// Internal shortcut registry state
#[derive(Default)]
struct ShortcutRegistryState {
    shortcuts: HashMap<KeyCombo, HotkeyCallback>,
}

/// Registry for global keyboard shortcuts and their callbacks.
///
/// This is a thread-safe, cloneable wrapper around the internal registry state.
#[derive(Clone, Default)]
pub struct ShortcutRegistry {
    state: Arc<Mutex<ShortcutRegistryState>>,
}

impl ShortcutRegistry {
    /// Create a new shortcut registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ShortcutRegistryState) -> R) -> R {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    /// Check if a combination is registered.
    pub fn is_registered(&self, combo: &KeyCombo) -> bool {
        self.with_state(|state| state.shortcuts.contains_key(combo))
    }

    /// Try to dispatch a key event to its registered callback.
    ///
    /// The callback runs outside the registry lock so that it may itself
    /// register or unregister shortcuts.
    pub fn try_dispatch(&self, event: &KeyEvent) -> KeyDisposition {
        let combo = event.combo();
        let callback = self.with_state(|state| state.shortcuts.get(&combo).cloned());
        match callback {
            Some(callback) if callback() => {
                log::trace!("Shortcut {} consumed", combo);
                KeyDisposition::Consumed
            },
            _ => KeyDisposition::PassThrough,
        }
    }

    /// All registered combinations.
    pub fn shortcuts(&self) -> Vec<KeyCombo> {
        self.with_state(|state| state.shortcuts.keys().copied().collect())
    }

    /// Number of registered combinations.
    pub fn len(&self) -> usize {
        self.with_state(|state| state.shortcuts.len())
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyListener for ShortcutRegistry {
    fn register(&mut self, combo: KeyCombo, callback: HotkeyCallback) {
        self.with_state(|state| {
            state.shortcuts.insert(combo, callback);
        });
    }

    fn unregister(&mut self, combo: &KeyCombo) {
        self.with_state(|state| {
            state.shortcuts.remove(combo);
        });
    }
}
