// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyboard navigation
//!
//! [resolve] maps a key press to at most one [Transition] given the current
//! [MenuState]. It never mutates anything; the menu bar feeds the result to
//! its state machine.

use crate::menu::node::{MenuConfig, MenuNode, NodeRef};
use crate::menu::state::{Cascade, MenuState, Transition};
use crate::shortcut::{Key, KeyEvent};

/// Where keyboard focus was when a key was pressed.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyTarget<A> {
    /// Inside the open cascade (or nowhere in particular).
    Menu,
    /// On a top-level trigger.
    TopLevel {
        /// Top-level index.
        index: usize,
        /// Trigger handle.
        anchor: Option<A>,
    },
}

/// A key press routed to the menu bar.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyInput<A> {
    /// The key and modifiers.
    pub event: KeyEvent,
    /// Where focus was.
    pub target: KeyTarget<A>,
}

impl<A> KeyInput<A> {
    /// A key press inside the open cascade.
    pub fn menu(event: KeyEvent) -> Self {
        Self {
            event,
            target: KeyTarget::Menu,
        }
    }

    /// A key press on a top-level trigger.
    pub fn top_level(event: KeyEvent, index: usize, anchor: Option<A>) -> Self {
        Self {
            event,
            target: KeyTarget::TopLevel { index, anchor },
        }
    }
}

/// Index of the next navigable item after `from`, wrapping around.
///
/// With `from == None` the search starts before the first item (forward) or
/// after the last (backward). Dividers and disabled items are skipped;
/// components are navigable. Returns `None` if nothing qualifies.
pub(crate) fn next_navigable(items: &[MenuNode], from: Option<usize>, forward: bool) -> Option<usize> {
    let len = items.len();
    if len == 0 {
        return None;
    }
    let start = match (from, forward) {
        (Some(index), true) => index + 1,
        (Some(index), false) => index + len - 1,
        (None, true) => 0,
        (None, false) => len - 1,
    };
    (0..len)
        .map(|offset| {
            if forward {
                (start + offset) % len
            } else {
                (start + len - offset) % len
            }
        })
        .find(|&index| items[index].is_navigable())
}

/// Next openable top-level menu after `from`, wrapping around.
pub(crate) fn next_top_level(config: &MenuConfig, from: usize, forward: bool) -> Option<usize> {
    let len = config.len();
    (1..=len)
        .map(|offset| {
            if forward {
                (from + offset) % len
            } else {
                (from + len * offset - offset) % len
            }
        })
        .find(|&index| config.top_level(index).is_some_and(|menu| menu.is_openable()))
}

fn focus_step<A>(config: &MenuConfig, cascade: &Cascade<A>, forward: bool) -> Option<Transition<A>> {
    let submenu = config.submenu_at(cascade.deepest_open())?;
    let current = cascade.focused_index();
    let next = next_navigable(&submenu.items, current, forward)?;
    if Some(next) == current {
        return None;
    }
    Some(Transition::Focus { child: next })
}

fn focus_edge<A>(config: &MenuConfig, cascade: &Cascade<A>, first: bool) -> Option<Transition<A>> {
    let submenu = config.submenu_at(cascade.deepest_open())?;
    let child = next_navigable(&submenu.items, None, first)?;
    if cascade.focused_index() == Some(child) {
        return None;
    }
    Some(Transition::Focus { child })
}

fn focused_node<'c, A>(config: &'c MenuConfig, cascade: &Cascade<A>) -> Option<&'c MenuNode> {
    match config.node_at(cascade.focused()?)? {
        NodeRef::Child(node) => Some(node),
        NodeRef::TopLevel(_) => None,
    }
}

fn switch_top_level<A>(config: &MenuConfig, cascade: &Cascade<A>, forward: bool) -> Option<Transition<A>> {
    let top = cascade.path().first().copied()?;
    let index = next_top_level(config, top, forward)?;
    if index == top {
        return None;
    }
    Some(Transition::OpenTopLevel { index, anchor: None })
}

/// Resolve a key press to a transition.
///
/// Keys with modifiers never navigate. Returns `None` when the key has no
/// meaning in the current state.
pub fn resolve<A>(config: &MenuConfig, state: &MenuState<A>, input: KeyInput<A>) -> Option<Transition<A>> {
    let KeyInput { event, target } = input;
    if !event.modifiers.is_empty() {
        return None;
    }

    let Some(cascade) = state.cascade() else {
        return match (target, event.key) {
            (KeyTarget::TopLevel { index, anchor }, Key::ArrowDown | Key::Enter | Key::Space) => {
                Some(Transition::OpenTopLevel { index, anchor })
            },
            _ => None,
        };
    };

    match event.key {
        Key::ArrowDown => focus_step(config, cascade, true),
        Key::ArrowUp => focus_step(config, cascade, false),
        Key::Home => focus_edge(config, cascade, true),
        Key::End => focus_edge(config, cascade, false),
        Key::ArrowRight => match focused_node(config, cascade) {
            Some(MenuNode::Submenu(submenu)) if submenu.is_openable() => {
                Some(Transition::ExpandFocused { anchor: None })
            },
            _ => switch_top_level(config, cascade, true),
        },
        Key::ArrowLeft => {
            if cascade.open_levels() > 1 {
                Some(Transition::CollapseOne)
            } else {
                switch_top_level(config, cascade, false)
            }
        },
        Key::Enter | Key::Space => match focused_node(config, cascade)? {
            MenuNode::Action(_) => Some(Transition::ActivateLeaf),
            MenuNode::Submenu(_) => Some(Transition::ExpandFocused { anchor: None }),
            MenuNode::Divider | MenuNode::Component(_) => None,
        },
        Key::Escape => {
            if cascade.path().len() > 1 {
                Some(Transition::CollapseOne)
            } else {
                Some(Transition::CloseAll)
            }
        },
        _ => None,
    }
}
