// SPDX-License-Identifier: MIT OR Apache-2.0
//! Hotkey extraction
//!
//! Walks a [MenuConfig] once and collects every action shortcut into a
//! [HotkeyTable]. The table is rebuilt whenever the config changes and
//! published through a [SharedHotkeys] handle, so a lookup never observes a
//! half-built table.

use crate::menu::error::ConfigError;
use crate::menu::node::{ActionItem, MenuConfig};
use crate::shortcut::{KeyCombo, KeyEvent};
use arc_swap::ArcSwap;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

/// An action reachable through a global key combination.
#[derive(Clone, Debug)]
pub struct HotkeyBinding {
    /// Index path of the action in the config.
    pub path: Vec<usize>,
    /// The bound action.
    pub action: ActionItem,
}

impl HotkeyBinding {
    /// Run the action unless it is disabled right now.
    pub fn fire(&self) -> bool {
        self.action.invoke()
    }
}

/// Mapping from normalized key combination to action.
#[derive(Clone, Debug, Default)]
pub struct HotkeyTable {
    bindings: IndexMap<KeyCombo, HotkeyBinding>,
}

/// Result of a lenient table build.
#[derive(Clone, Debug, Default)]
pub struct HotkeyBuild {
    /// Table with every colliding or invalid shortcut left out.
    pub table: HotkeyTable,
    /// Everything that was left out and why.
    pub errors: Vec<ConfigError>,
}

/// Build the hotkey table, failing on the first configuration error.
pub fn build_hotkey_table(config: &MenuConfig) -> Result<HotkeyTable, ConfigError> {
    let HotkeyBuild { table, mut errors } = HotkeyTable::build(config);
    if errors.is_empty() {
        Ok(table)
    } else {
        Err(errors.remove(0))
    }
}

impl HotkeyTable {
    /// Build a table, collecting errors instead of failing.
    ///
    /// A combination claimed by two different actions is dropped entirely, so
    /// neither action is reachable by hotkey, and a
    /// [ConfigError::DuplicateHotkey] is reported for each extra claimant. The
    /// same action listed twice under one shortcut is not a collision.
    /// Actions disabled by a static flag are skipped; actions with a dynamic
    /// flag are indexed and re-checked when fired.
    pub fn build(config: &MenuConfig) -> HotkeyBuild {
        let mut bindings: IndexMap<KeyCombo, HotkeyBinding> = IndexMap::new();
        let mut colliding: HashSet<KeyCombo> = HashSet::new();
        let mut errors = Vec::new();

        for (path, node) in config.walk() {
            let Some(action) = node.as_action() else {
                continue;
            };
            let Some(raw) = action.shortcut.as_deref() else {
                continue;
            };
            if raw.trim().is_empty() {
                continue;
            }
            if action.disabled.is_static() && action.disabled.get() {
                log::trace!("Skipping hotkey of statically disabled action '{}'", action.label);
                continue;
            }

            let combo: KeyCombo = match raw.parse() {
                Ok(combo) => combo,
                Err(source) => {
                    log::warn!("Invalid shortcut '{}' on '{}': {}", raw, action.label, source);
                    errors.push(ConfigError::InvalidShortcut {
                        label: action.label.clone(),
                        shortcut: raw.to_string(),
                        source,
                    });
                    continue;
                },
            };

            match bindings.get(&combo) {
                Some(existing) if Arc::ptr_eq(&existing.action.action, &action.action) => {},
                Some(existing) => {
                    log::warn!(
                        "Duplicate hotkey {}: '{}' collides with '{}'",
                        combo,
                        action.label,
                        existing.action.label
                    );
                    errors.push(ConfigError::DuplicateHotkey {
                        combo: combo.to_string(),
                        first: existing.action.label.clone(),
                        second: action.label.clone(),
                    });
                    colliding.insert(combo);
                },
                None => {
                    bindings.insert(
                        combo,
                        HotkeyBinding {
                            path,
                            action: action.clone(),
                        },
                    );
                },
            }
        }

        for combo in &colliding {
            bindings.shift_remove(combo);
        }

        log::debug!(
            "Built hotkey table: {} bindings, {} errors",
            bindings.len(),
            errors.len()
        );
        HotkeyBuild {
            table: HotkeyTable { bindings },
            errors,
        }
    }

    /// Look up a combination.
    pub fn get(&self, combo: &KeyCombo) -> Option<&HotkeyBinding> {
        self.bindings.get(combo)
    }

    /// Returns `true` if the combination is bound.
    pub fn contains(&self, combo: &KeyCombo) -> bool {
        self.bindings.contains_key(combo)
    }

    /// Fire the action bound to `combo`.
    ///
    /// Returns `None` if nothing is bound, otherwise whether the action ran.
    /// A bound but currently disabled action still counts as a hit.
    pub fn fire(&self, combo: &KeyCombo) -> Option<bool> {
        self.bindings.get(combo).map(HotkeyBinding::fire)
    }

    /// Fire the action bound to a raw key press.
    pub fn fire_event(&self, event: &KeyEvent) -> Option<bool> {
        self.fire(&event.combo())
    }

    /// Bound combinations in config pre-order.
    pub fn combos(&self) -> impl Iterator<Item = &KeyCombo> {
        self.bindings.keys()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// A hotkey table shared between the menu bar and global key listeners.
///
/// Rebuilds replace the whole table atomically.
#[derive(Clone)]
pub struct SharedHotkeys {
    table: Arc<ArcSwap<HotkeyTable>>,
}

impl SharedHotkeys {
    /// Publish an initial table.
    pub fn new(table: HotkeyTable) -> Self {
        Self {
            table: Arc::new(ArcSwap::from_pointee(table)),
        }
    }

    /// The currently published table.
    pub fn load(&self) -> Arc<HotkeyTable> {
        self.table.load_full()
    }

    /// Replace the published table, returning the previous one.
    pub fn swap(&self, table: HotkeyTable) -> Arc<HotkeyTable> {
        self.table.swap(Arc::new(table))
    }

    /// Fire through the currently published table.
    pub fn fire(&self, combo: &KeyCombo) -> Option<bool> {
        self.table.load().fire(combo)
    }
}

impl Default for SharedHotkeys {
    fn default() -> Self {
        Self::new(HotkeyTable::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::node::{DisabledFlag, Submenu};
    use crate::shortcut::{Key, Modifiers};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let hits = Arc::new(AtomicUsize::new(0));
        let inner = hits.clone();
        (hits, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_collects_nested_shortcuts() {
        let config = MenuConfig::new(vec![
            Submenu::new("File")
                .item(ActionItem::new("Save", || {}).shortcut("Ctrl+S"))
                .item(
                    Submenu::new("Export")
                        .item(ActionItem::new("PDF", || {}).shortcut("ctrl+shift+e")),
                ),
            Submenu::new("Help").item(ActionItem::new("About", || {})),
        ]);
        let table = build_hotkey_table(&config).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get(&KeyCombo::ctrl_shift(Key::Char('e'))).unwrap().path,
            vec![0, 1, 0]
        );
    }

    #[test]
    fn test_duplicate_is_reported_and_both_dropped() {
        let config = MenuConfig::new(vec![
            Submenu::new("File").item(ActionItem::new("Save", || {}).shortcut("Ctrl+S")),
            Submenu::new("Edit")
                .item(ActionItem::new("Search", || {}).shortcut("ctrl+s"))
                .item(ActionItem::new("Undo", || {}).shortcut("ctrl+z")),
        ]);
        let err = build_hotkey_table(&config).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateHotkey {
                combo: "ctrl+s".to_string(),
                first: "Save".to_string(),
                second: "Search".to_string(),
            }
        );

        let build = HotkeyTable::build(&config);
        assert_eq!(build.errors.len(), 1);
        assert!(!build.table.contains(&KeyCombo::ctrl(Key::Char('s'))));
        assert!(build.table.contains(&KeyCombo::ctrl(Key::Char('z'))));
    }

    #[test]
    fn test_same_action_twice_is_not_a_collision() {
        let save = ActionItem::new("Save", || {}).shortcut("ctrl+s");
        let config = MenuConfig::new(vec![
            Submenu::new("File").item(save.clone()),
            Submenu::new("Quick").item(save),
        ]);
        let table = build_hotkey_table(&config).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_invalid_shortcut_is_reported() {
        let config = MenuConfig::from(
            Submenu::new("File").item(ActionItem::new("Odd", || {}).shortcut("ctrl+nope")),
        );
        let build = HotkeyTable::build(&config);
        assert!(build.table.is_empty());
        assert!(matches!(build.errors[0], ConfigError::InvalidShortcut { .. }));
    }

    #[test]
    fn test_static_disabled_is_skipped_dynamic_is_rechecked() {
        let (hits, action) = counter();
        let flag = DisabledFlag::dynamic(false);
        let config = MenuConfig::from(
            Submenu::new("File")
                .item(ActionItem::new("Gone", || {}).shortcut("ctrl+g").disabled(true))
                .item(
                    ActionItem::new("Toggle", action)
                        .shortcut("ctrl+t")
                        .disabled(flag.clone()),
                ),
        );
        let table = build_hotkey_table(&config).unwrap();
        assert!(!table.contains(&KeyCombo::ctrl(Key::Char('g'))));

        let press = KeyEvent::new(Key::Char('t'), Modifiers::CONTROL);
        assert_eq!(table.fire_event(&press), Some(true));
        flag.set(true);
        assert_eq!(table.fire_event(&press), Some(false));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(table.fire(&KeyCombo::ctrl(Key::Char('g'))), None);
    }

    #[test]
    fn test_shared_swap_is_visible_to_clones() {
        let shared = SharedHotkeys::default();
        let observer = shared.clone();
        let config = MenuConfig::from(
            Submenu::new("File").item(ActionItem::new("Save", || {}).shortcut("ctrl+s")),
        );
        shared.swap(build_hotkey_table(&config).unwrap());
        assert_eq!(observer.load().len(), 1);
        assert_eq!(observer.fire(&KeyCombo::ctrl(Key::Char('s'))), Some(true));
    }
}
