#![warn(missing_docs)]

//! Core library for menubar => See `menubar` crate.
//!
//! Contains the menu interaction engine: the declarative menu tree, hotkey
//! extraction, the open-path state machine, keyboard navigation and the
//! binding to an external renderer.

/// Contains the [MenuBarOptions](config::MenuBarOptions) struct.
pub mod config;

/// Contains the menu tree and the interaction engine built on it.
pub mod menu;

/// Contains key combinations and the global shortcut registry.
pub mod shortcut;

/// Contains the [Update](update::Update) flags returned by event handling.
pub mod update;
