// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in demonstration menu.

use crate::menu::component::{MenuCloser, MenuComponent};
use crate::menu::node::{ActionItem, ComponentItem, MenuConfig, Submenu};
use std::sync::{Arc, Mutex};

type SizeCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

#[derive(Default)]
struct ChooserState {
    hovered: (usize, usize),
    closer: Option<MenuCloser>,
}

/// A rows-by-columns grid picker.
///
/// Hovering a cell previews its size; selecting reports it and asks the
/// menu bar to close.
pub struct TableSizeChooser {
    max_rows: usize,
    max_cols: usize,
    on_size_select: SizeCallback,
    state: Mutex<ChooserState>,
}

impl TableSizeChooser {
    /// Create a chooser starting at `current` (rows, columns).
    pub fn new<F>(max_rows: usize, max_cols: usize, current: (usize, usize), on_size_select: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        let chooser = Self {
            max_rows: max_rows.max(1),
            max_cols: max_cols.max(1),
            on_size_select: Arc::new(on_size_select),
            state: Mutex::new(ChooserState::default()),
        };
        chooser.hover(current.0, current.1);
        chooser
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ChooserState) -> R) -> R {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    /// Preview a size, clamped to `1..=max`.
    pub fn hover(&self, rows: usize, cols: usize) {
        let size = (rows.clamp(1, self.max_rows), cols.clamp(1, self.max_cols));
        self.with_state(|state| state.hovered = size);
    }

    /// The previewed size.
    pub fn hovered(&self) -> (usize, usize) {
        self.with_state(|state| state.hovered)
    }

    /// Report the previewed size and request a close.
    pub fn select(&self) {
        let ((rows, cols), closer) = self.with_state(|state| (state.hovered, state.closer.clone()));
        log::debug!("Selected table size {}x{}", rows, cols);
        (self.on_size_select)(rows, cols);
        if let Some(closer) = closer {
            closer.request_close();
        }
    }
}

impl MenuComponent for TableSizeChooser {
    fn name(&self) -> &str {
        "table-size-chooser"
    }

    fn attach(&self, closer: MenuCloser) {
        self.with_state(|state| state.closer = Some(closer));
    }
}

/// The demonstration menu: a File menu with a hotkey, a disabled entry and a
/// divider, and a Table menu hosting a [TableSizeChooser].
pub fn default_menu_config() -> MenuConfig {
    MenuConfig::new(vec![
        Submenu::new("File")
            .item(
                ActionItem::new("Hello", || log::info!("New file"))
                    .icon("file-copy")
                    .shortcut("Ctrl+S"),
            )
            .item(
                ActionItem::new("Open", || log::info!("Open file action triggered"))
                    .icon("folder-open")
                    .disabled(true),
            )
            .divider()
            .item(ActionItem::new("Save", || log::info!("Save file")).icon("save"))
            .item(ActionItem::new("Exit", || log::info!("Exit application")).icon("exit-to-app")),
        Submenu::new("Table").item(ComponentItem::new(TableSizeChooser::new(
            10,
            10,
            (3, 3),
            |rows, cols| log::info!("Selected size: {}x{}", rows, cols),
        ))),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::hotkeys::build_hotkey_table;
    use crate::menu::node::MenuNode;
    use crate::shortcut::{Key, KeyCombo};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_default_config_shape() {
        let config = default_menu_config();
        assert_eq!(config.len(), 2);
        let file = config.top_level(0).unwrap();
        assert_eq!(file.items.len(), 5);
        assert!(file.items[1].is_disabled());
        assert!(matches!(file.items[2], MenuNode::Divider));
        assert!(matches!(config.top_level(1).unwrap().items[0], MenuNode::Component(_)));

        let table = build_hotkey_table(&config).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&KeyCombo::ctrl(Key::Char('s'))).unwrap().path, vec![0, 0]);
    }

    #[test]
    fn test_chooser_clamps_and_requests_close() {
        let picked = Arc::new(AtomicUsize::new(0));
        let sink = picked.clone();
        let chooser = TableSizeChooser::new(4, 4, (3, 3), move |rows, cols| {
            sink.store(rows * 10 + cols, Ordering::SeqCst);
        });
        assert_eq!(chooser.hovered(), (3, 3));
        chooser.hover(9, 0);
        assert_eq!(chooser.hovered(), (4, 1));

        let closer = MenuCloser::new();
        chooser.attach(closer.clone());
        chooser.select();
        assert_eq!(picked.load(Ordering::SeqCst), 41);
        assert!(closer.is_requested());
    }
}
