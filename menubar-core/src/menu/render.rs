// SPDX-License-Identifier: MIT OR Apache-2.0
//! Render binding
//!
//! The engine never draws. A [MenuRenderer] is told imperatively which
//! submenus are open; [RenderBinding] computes those calls by diffing two
//! [MenuState]s, holding no state of its own.

use crate::menu::component::MenuCloser;
use crate::menu::node::{MenuConfig, Submenu};
use crate::menu::state::MenuState;
use std::time::Duration;

/// Colour scheme requested by the embedding application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorTheme {
    /// Light theme.
    #[default]
    Light,
    /// Dark theme.
    Dark,
}

/// Presentation hints handed to the renderer untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderHints {
    /// Colour scheme.
    pub color_theme: ColorTheme,
    /// Suppress press ripples on triggers and items.
    pub disable_ripple: bool,
    /// Popup open/close animation length. Zero disables animation.
    pub transition_duration: Duration,
}

impl Default for RenderHints {
    fn default() -> Self {
        Self {
            color_theme: ColorTheme::Light,
            disable_ripple: true,
            transition_duration: Duration::ZERO,
        }
    }
}

/// The external rendering collaborator.
///
/// Every call must be idempotent: closing a path that is not open is a
/// no-op.
pub trait MenuRenderer<A> {
    /// Show the popup for the submenu at `path`, positioned against `anchor`.
    ///
    /// `anchor` is `None` when the submenu was opened from the keyboard
    /// without a known handle; the renderer then places it by path.
    /// Components inside `submenu` should be handed a clone of `closer`.
    fn open(&mut self, path: &[usize], anchor: Option<&A>, submenu: &Submenu, closer: &MenuCloser);

    /// Hide the popup for the submenu at `path` and everything below it.
    fn close(&mut self, path: &[usize]);

    /// Hide every popup.
    fn close_all(&mut self);

    /// Move the keyboard highlight.
    fn highlight(&mut self, _path: Option<&[usize]>) {}

    /// Called once when the menu bar is mounted.
    fn configure(&mut self, _hints: &RenderHints) {}
}

/// One visible popup.
#[derive(Debug)]
pub struct PlannedPopup<'a, A> {
    /// Path of the submenu.
    pub path: &'a [usize],
    /// Handle it was opened against.
    pub anchor: Option<&'a A>,
    /// The submenu itself.
    pub submenu: &'a Submenu,
}

/// Borrowed view of what should be on screen for a given state.
#[derive(Debug)]
pub struct RenderPlan<'a, A> {
    config: &'a MenuConfig,
    popups: Vec<PlannedPopup<'a, A>>,
    highlight: Option<&'a [usize]>,
}

impl<'a, A> RenderPlan<'a, A> {
    /// Derive the plan for `state`.
    ///
    /// Levels that no longer resolve against `config` are dropped together
    /// with everything below them.
    pub fn new(config: &'a MenuConfig, state: &'a MenuState<A>) -> Self {
        let mut popups = Vec::new();
        let mut highlight = None;
        if let Some(cascade) = state.cascade() {
            for (path, anchor) in cascade.levels() {
                let Some(submenu) = config.submenu_at(path) else {
                    break;
                };
                popups.push(PlannedPopup {
                    path,
                    anchor,
                    submenu,
                });
            }
            if popups.len() == cascade.open_levels() {
                highlight = cascade.focused();
            }
        }
        Self {
            config,
            popups,
            highlight,
        }
    }

    /// Visible popups, outermost first.
    pub fn popups(&self) -> &[PlannedPopup<'a, A>] {
        &self.popups
    }

    /// Path of the keyboard-highlighted item.
    pub fn highlight(&self) -> Option<&'a [usize]> {
        self.highlight
    }

    /// The open top-level index.
    pub fn open_top_level(&self) -> Option<usize> {
        self.popups.first().and_then(|popup| popup.path.first().copied())
    }

    /// Every top-level menu with whether it is the open one.
    pub fn top_levels(&self) -> impl Iterator<Item = (usize, &'a Submenu, bool)> + '_ {
        let open = self.open_top_level();
        self.config
            .menus()
            .iter()
            .enumerate()
            .map(move |(index, submenu)| (index, submenu, open == Some(index)))
    }

    /// Returns `true` if nothing is open.
    pub fn is_empty(&self) -> bool {
        self.popups.is_empty()
    }
}

/// Translates state changes into [MenuRenderer] calls.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderBinding;

impl RenderBinding {
    /// Issue the calls that take the renderer from `old` to `new`.
    ///
    /// Popups shared by both states are left alone. Popups only in `old` are
    /// closed deepest first, then popups only in `new` are opened outermost
    /// first. A transition to nothing open is a single `close_all`.
    pub fn apply<A, R>(
        config: &MenuConfig,
        old: &MenuState<A>,
        new: &MenuState<A>,
        renderer: &mut R,
        closer: &MenuCloser,
    ) where
        R: MenuRenderer<A> + ?Sized,
    {
        let before = RenderPlan::new(config, old);
        let after = RenderPlan::new(config, new);

        if after.is_empty() {
            if !before.is_empty() {
                renderer.close_all();
            }
            if before.highlight().is_some() {
                renderer.highlight(None);
            }
            return;
        }

        let shared = before
            .popups()
            .iter()
            .zip(after.popups())
            .take_while(|(a, b)| a.path == b.path)
            .count();

        for popup in before.popups()[shared..].iter().rev() {
            renderer.close(popup.path);
        }
        for popup in &after.popups()[shared..] {
            renderer.open(popup.path, popup.anchor, popup.submenu, closer);
        }
        if before.highlight() != after.highlight() {
            renderer.highlight(after.highlight());
        }
    }

    /// Paint `state` from scratch.
    pub fn repaint<A, R>(config: &MenuConfig, state: &MenuState<A>, renderer: &mut R, closer: &MenuCloser)
    where
        R: MenuRenderer<A> + ?Sized,
    {
        renderer.close_all();
        let plan = RenderPlan::new(config, state);
        for popup in plan.popups() {
            renderer.open(popup.path, popup.anchor, popup.submenu, closer);
        }
        renderer.highlight(plan.highlight());
    }
}

/// A renderer that records every call, for tests and headless embedding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingRenderer {
    /// Calls in order.
    pub calls: Vec<RenderCall>,
}

/// A call received by [RecordingRenderer].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderCall {
    /// [MenuRenderer::open] with the submenu label.
    Open(Vec<usize>, String),
    /// [MenuRenderer::close].
    Close(Vec<usize>),
    /// [MenuRenderer::close_all].
    CloseAll,
    /// [MenuRenderer::highlight].
    Highlight(Option<Vec<usize>>),
}

impl RecordingRenderer {
    /// Take the recorded calls.
    pub fn take(&mut self) -> Vec<RenderCall> {
        std::mem::take(&mut self.calls)
    }
}

impl<A> MenuRenderer<A> for RecordingRenderer {
    fn open(&mut self, path: &[usize], _anchor: Option<&A>, submenu: &Submenu, _closer: &MenuCloser) {
        self.calls.push(RenderCall::Open(path.to_vec(), submenu.label.clone()));
    }

    fn close(&mut self, path: &[usize]) {
        self.calls.push(RenderCall::Close(path.to_vec()));
    }

    fn close_all(&mut self) {
        self.calls.push(RenderCall::CloseAll);
    }

    fn highlight(&mut self, path: Option<&[usize]>) {
        self.calls.push(RenderCall::Highlight(path.map(<[usize]>::to_vec)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MenuBarOptions;
    use crate::menu::node::ActionItem;
    use crate::menu::state::{MenuStateMachine, Transition};

    fn config() -> MenuConfig {
        MenuConfig::new(vec![
            Submenu::new("File")
                .item(ActionItem::new("New", || {}))
                .item(Submenu::new("Recent").item(ActionItem::new("a.txt", || {}))),
            Submenu::new("Edit").item(ActionItem::new("Undo", || {})),
        ])
    }

    fn diff(config: &MenuConfig, old: &MenuState<()>, new: &MenuState<()>) -> Vec<RenderCall> {
        let mut renderer = RecordingRenderer::default();
        RenderBinding::apply(config, old, new, &mut renderer, &MenuCloser::new());
        renderer.calls
    }

    #[test]
    fn test_plan_lists_open_levels() {
        let config = config();
        let mut m = MenuStateMachine::<()>::new(MenuBarOptions::default());
        m.click_top_level(&config, 0, None);
        m.expand(&config, 1, None);
        let plan = RenderPlan::new(&config, m.state());
        let paths: Vec<&[usize]> = plan.popups().iter().map(|p| p.path).collect();
        assert_eq!(paths, vec![&[0][..], &[0, 1][..]]);
        let open: Vec<bool> = plan.top_levels().map(|(_, _, open)| open).collect();
        assert_eq!(open, vec![true, false]);
        assert!(RenderPlan::new(&config, &MenuState::<()>::Closed).is_empty());
    }

    #[test]
    fn test_diff_opens_closes_and_switches() {
        let config = config();
        let mut m = MenuStateMachine::<()>::new(MenuBarOptions::default());
        let closed = m.state().clone();
        m.click_top_level(&config, 0, None);
        let file = m.state().clone();
        assert_eq!(diff(&config, &closed, &file), vec![RenderCall::Open(vec![0], "File".into())]);

        m.expand(&config, 1, None);
        let recent = m.state().clone();
        assert_eq!(
            diff(&config, &file, &recent),
            vec![RenderCall::Open(vec![0, 1], "Recent".into())]
        );

        m.hover_top_level(&config, 1, None);
        let edit = m.state().clone();
        assert_eq!(
            diff(&config, &recent, &edit),
            vec![
                RenderCall::Close(vec![0, 1]),
                RenderCall::Close(vec![0]),
                RenderCall::Open(vec![1], "Edit".into()),
            ]
        );
        assert_eq!(diff(&config, &edit, &closed), vec![RenderCall::CloseAll]);
        assert!(diff(&config, &closed, &closed).is_empty());
    }

    #[test]
    fn test_focus_moves_highlight_only() {
        let config = config();
        let mut m = MenuStateMachine::<()>::new(MenuBarOptions::default());
        m.click_top_level(&config, 0, None);
        let before = m.state().clone();
        m.apply(&config, Transition::Focus { child: 0 });
        assert_eq!(
            diff(&config, &before, m.state()),
            vec![RenderCall::Highlight(Some(vec![0, 0]))]
        );
    }
}
