#![warn(missing_docs)]

//! A keyboard- and pointer-navigable hierarchical menu bar engine.
//!
//! The engine owns the interaction model only: which path through the menu
//! tree is open, how keys and pointer events move it, and which global
//! shortcuts the tree declares. Drawing is left to a [MenuRenderer](core::menu::MenuRenderer).

pub use menubar_core as core;
#[cfg(feature = "services")]
pub use menubar_services as services;

/// A "prelude" for users of the menubar engine.
///
/// Importing this module brings into scope the most common types
/// needed to drive a menu bar.
///
/// ```rust
/// use menubar::prelude::*;
///
/// let mut bar: MenuBar<()> = MenuBar::new(
///     Submenu::new("File").item(ActionItem::new("Save", || {}).shortcut("Ctrl+S")),
///     MenuBarOptions::default(),
/// );
/// bar.dispatch([InputEvent::PointerDown(PointerTarget::TopLevel { index: 0, anchor: () })]);
/// assert_eq!(bar.state().path(), &[0]);
/// ```
pub mod prelude {
    pub use crate::core::config::MenuBarOptions;
    pub use crate::core::menu::{
        default_menu_config, ActionItem, ComponentItem, ConfigError, DisabledFlag, InputEvent, KeyInput,
        MenuBar, MenuCloser, MenuComponent, MenuConfig, MenuNode, MenuRenderer, MenuState, PointerTarget,
        RenderHints, Submenu,
    };
    pub use crate::core::shortcut::{Key, KeyCombo, KeyEvent, KeyListener, Modifiers, ShortcutRegistry};
    pub use crate::core::update::Update;

    #[cfg(feature = "services")]
    pub use crate::services::SettingsRegistry;
}
