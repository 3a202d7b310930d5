//! Menu interaction engine
//!
//! Config tree, hotkey extraction, the open-path state machine, keyboard
//! navigation and the render binding, tied together by [MenuBar].

pub mod bar;
pub mod component;
pub mod defaults;
pub mod error;
pub mod hotkeys;
pub mod navigation;
pub mod node;
pub mod render;
pub mod state;

// Re-export core types
pub use bar::{InputEvent, MenuBar, NullRenderer, PointerTarget};
pub use component::{MenuCloser, MenuComponent};
pub use defaults::{default_menu_config, TableSizeChooser};
pub use error::ConfigError;
pub use hotkeys::{build_hotkey_table, HotkeyBinding, HotkeyBuild, HotkeyTable, SharedHotkeys};
pub use navigation::{resolve, KeyInput, KeyTarget};
pub use node::{ActionItem, ComponentItem, DisabledFlag, MenuAction, MenuConfig, MenuNode, NodeRef, Submenu};
pub use render::{
    ColorTheme, MenuRenderer, PlannedPopup, RecordingRenderer, RenderBinding, RenderCall, RenderHints, RenderPlan,
};
pub use state::{step, Cascade, Effect, Ignored, MenuState, MenuStateMachine, OpenPath, Outcome, Step, Transition};
