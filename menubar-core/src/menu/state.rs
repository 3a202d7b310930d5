// SPDX-License-Identifier: MIT OR Apache-2.0
//! Open-path state machine
//!
//! The whole interaction state of a menu bar is one [MenuState]: either
//! [MenuState::Closed] or an open [Cascade]. A cascade is an [OpenPath] of
//! indices plus the anchor of every open level.
//!
//! The first `anchors.len()` entries of the path are open submenus (their
//! popups are visible). The path may carry one extra trailing index: the
//! focused item inside the deepest open popup. The top-level entry is always
//! open.
//!
//! [step] is a pure function from state and [Transition] to the next state
//! and an optional [Effect]; [MenuStateMachine] commits the result and runs
//! the effect.

use crate::config::MenuBarOptions;
use crate::menu::navigation::next_navigable;
use crate::menu::node::{ActionItem, MenuConfig, MenuNode, NodeRef, Submenu};
use std::fmt;
use std::ops::Deref;

/// Index path from a top-level menu down to one node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct OpenPath(Vec<usize>);

impl OpenPath {
    /// Create a path from indices.
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// The indices.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Consume into the raw indices.
    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }

    /// Returns `true` if every proper prefix resolves to a submenu and the
    /// full path resolves to some node of `config`.
    pub fn is_valid_in(&self, config: &MenuConfig) -> bool {
        if self.0.is_empty() {
            return true;
        }
        (1..self.0.len()).all(|len| config.submenu_at(&self.0[..len]).is_some())
            && config.node_at(&self.0).is_some()
    }
}

impl Deref for OpenPath {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for OpenPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for OpenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// An open chain of menus.
#[derive(Clone, Debug, PartialEq)]
pub struct Cascade<A> {
    path: OpenPath,
    anchors: Vec<Option<A>>,
}

impl<A> Cascade<A> {
    fn top(index: usize, anchor: Option<A>) -> Self {
        Self {
            path: OpenPath(vec![index]),
            anchors: vec![anchor],
        }
    }

    /// The full path, including a focused item if any.
    pub fn path(&self) -> &OpenPath {
        &self.path
    }

    /// Number of open popups.
    pub fn open_levels(&self) -> usize {
        self.anchors.len()
    }

    /// Path of the deepest open submenu.
    pub fn deepest_open(&self) -> &[usize] {
        &self.path[..self.anchors.len()]
    }

    /// Index of the focused item inside the deepest open popup.
    pub fn focused_index(&self) -> Option<usize> {
        self.path.get(self.anchors.len()).copied()
    }

    /// Full path of the focused item.
    pub fn focused(&self) -> Option<&[usize]> {
        self.focused_index().map(|_| &self.path[..])
    }

    /// Anchor the submenu at `level` was opened against.
    pub fn anchor(&self, level: usize) -> Option<&A> {
        self.anchors.get(level).and_then(Option::as_ref)
    }

    /// Open levels as `(submenu path, anchor)` pairs, outermost first.
    pub fn levels(&self) -> impl Iterator<Item = (&[usize], Option<&A>)> {
        self.anchors
            .iter()
            .enumerate()
            .map(move |(level, anchor)| (&self.path[..=level], anchor.as_ref()))
    }

    fn truncate_to_open(&mut self, open: usize) {
        self.anchors.truncate(open);
        self.path.0.truncate(open);
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.path == other.path && self.anchors.len() == other.anchors.len()
    }
}

/// Interaction state of a menu bar.
#[derive(Clone, Debug, PartialEq)]
pub enum MenuState<A> {
    /// Nothing is open.
    Closed,
    /// A cascade is open.
    Open(Cascade<A>),
}

impl<A> Default for MenuState<A> {
    fn default() -> Self {
        MenuState::Closed
    }
}

impl<A> MenuState<A> {
    /// Returns `true` if some menu is open.
    pub fn is_open(&self) -> bool {
        matches!(self, MenuState::Open(_))
    }

    /// The cascade, if open.
    pub fn cascade(&self) -> Option<&Cascade<A>> {
        match self {
            MenuState::Closed => None,
            MenuState::Open(cascade) => Some(cascade),
        }
    }

    /// The open path; empty when closed.
    pub fn path(&self) -> &[usize] {
        match self {
            MenuState::Closed => &[],
            MenuState::Open(cascade) => &cascade.path,
        }
    }

    /// Length of the open path.
    pub fn depth(&self) -> usize {
        self.path().len()
    }

    /// Index of the open top-level menu.
    pub fn top_level(&self) -> Option<usize> {
        self.path().first().copied()
    }

    /// Full path of the focused item.
    pub fn focused(&self) -> Option<&[usize]> {
        self.cascade().and_then(Cascade::focused)
    }

    /// Compare path and open levels, ignoring anchors.
    pub fn same_shape(&self, other: &Self) -> bool {
        match (self, other) {
            (MenuState::Closed, MenuState::Closed) => true,
            (MenuState::Open(a), MenuState::Open(b)) => a.same_shape(b),
            _ => false,
        }
    }
}

/// A requested change of [MenuState].
#[derive(Clone, Debug, PartialEq)]
pub enum Transition<A> {
    /// Pointer click on a top-level trigger. Toggles closed when that menu
    /// is already open with nothing focused.
    ClickTopLevel {
        /// Top-level index.
        index: usize,
        /// Trigger handle.
        anchor: Option<A>,
    },
    /// Open a top-level menu without toggling (keyboard).
    OpenTopLevel {
        /// Top-level index.
        index: usize,
        /// Trigger handle, if known.
        anchor: Option<A>,
    },
    /// Pointer moved onto a top-level trigger.
    HoverTopLevel {
        /// Top-level index.
        index: usize,
        /// Trigger handle.
        anchor: Option<A>,
    },
    /// Open child `child` of the deepest open submenu.
    Expand {
        /// Index inside the deepest open submenu.
        child: usize,
        /// Item handle.
        anchor: Option<A>,
    },
    /// Open the focused submenu item and focus its first item.
    ExpandFocused {
        /// Item handle.
        anchor: Option<A>,
    },
    /// Focus child `child` of the deepest open submenu.
    Focus {
        /// Index inside the deepest open submenu.
        child: usize,
    },
    /// Pointer moved onto an item anywhere in the visible cascade.
    HoverItem {
        /// Full node path.
        path: Vec<usize>,
        /// Item handle.
        anchor: Option<A>,
    },
    /// Pointer left an item.
    LeaveItem {
        /// Full node path.
        path: Vec<usize>,
    },
    /// Pointer click on an item anywhere in the visible cascade.
    ClickItem {
        /// Full node path.
        path: Vec<usize>,
        /// Item handle.
        anchor: Option<A>,
    },
    /// Drop the last path element.
    CollapseOne,
    /// Activate the focused leaf and close everything.
    ActivateLeaf,
    /// Close everything.
    CloseAll,
}

/// Why a transition was ignored. Never an error: these arise from fast or
/// ambiguous input and leave the state untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ignored {
    /// The transition needs an open menu.
    NothingOpen,
    /// An index does not exist.
    OutOfRange,
    /// The target is disabled.
    Disabled,
    /// The target is a divider.
    Divider,
    /// The target is a submenu without items.
    EmptySubmenu,
    /// The target is not a submenu.
    NotASubmenu,
    /// The target is not an activatable leaf.
    NotALeaf,
    /// Nothing is focused.
    NoFocus,
    /// The target is not inside a visible popup.
    NotVisible,
    /// Hover alone never opens a closed bar.
    HoverWhileClosed,
}

/// Side effect produced by a transition.
#[derive(Clone, Debug)]
pub enum Effect {
    /// Run this action.
    Invoke(ActionItem),
}

/// The result of a successful [step].
#[derive(Clone, Debug)]
pub struct Step<A> {
    /// The next state.
    pub state: MenuState<A>,
    /// Effect to perform after committing the state.
    pub effect: Option<Effect>,
}

impl<A> Step<A> {
    fn to(state: MenuState<A>) -> Self {
        Self {
            state,
            effect: None,
        }
    }
}

fn open_cascade<A: Clone>(state: &MenuState<A>) -> Result<Cascade<A>, Ignored> {
    state.cascade().cloned().ok_or(Ignored::NothingOpen)
}

fn deepest_submenu<'c, A>(config: &'c MenuConfig, cascade: &Cascade<A>) -> Result<&'c Submenu, Ignored> {
    config
        .submenu_at(cascade.deepest_open())
        .ok_or(Ignored::OutOfRange)
}

fn check_openable(submenu: &Submenu) -> Result<(), Ignored> {
    if submenu.disabled.get() {
        Err(Ignored::Disabled)
    } else if submenu.items.is_empty() {
        Err(Ignored::EmptySubmenu)
    } else {
        Ok(())
    }
}

fn check_focusable(node: &MenuNode) -> Result<(), Ignored> {
    match node {
        MenuNode::Divider => Err(Ignored::Divider),
        node if node.is_disabled() => Err(Ignored::Disabled),
        _ => Ok(()),
    }
}

fn open_top_level<A>(config: &MenuConfig, index: usize, anchor: Option<A>) -> Result<Step<A>, Ignored> {
    let top = config.top_level(index).ok_or(Ignored::OutOfRange)?;
    check_openable(top)?;
    Ok(Step::to(MenuState::Open(Cascade::top(index, anchor))))
}

/// Narrow the cascade so that `parent` is its deepest open submenu.
fn retarget<A>(mut cascade: Cascade<A>, parent: &[usize]) -> Result<Cascade<A>, Ignored> {
    if parent.is_empty()
        || parent.len() > cascade.open_levels()
        || cascade.path[..parent.len()] != *parent
    {
        return Err(Ignored::NotVisible);
    }
    cascade.truncate_to_open(parent.len());
    Ok(cascade)
}

fn expand<A>(
    config: &MenuConfig,
    mut cascade: Cascade<A>,
    child: usize,
    anchor: Option<A>,
) -> Result<Step<A>, Ignored> {
    let parent = deepest_submenu(config, &cascade)?;
    let node = parent.items.get(child).ok_or(Ignored::OutOfRange)?;
    let submenu = node.as_submenu().ok_or(Ignored::NotASubmenu)?;
    check_openable(submenu)?;
    let open = cascade.open_levels();
    cascade.truncate_to_open(open);
    cascade.path.0.push(child);
    cascade.anchors.push(anchor);
    Ok(Step::to(MenuState::Open(cascade)))
}

fn focus<A>(config: &MenuConfig, mut cascade: Cascade<A>, child: usize) -> Result<Step<A>, Ignored> {
    let parent = deepest_submenu(config, &cascade)?;
    let node = parent.items.get(child).ok_or(Ignored::OutOfRange)?;
    check_focusable(node)?;
    let open = cascade.open_levels();
    cascade.truncate_to_open(open);
    cascade.path.0.push(child);
    Ok(Step::to(MenuState::Open(cascade)))
}

fn activate<A>(config: &MenuConfig, cascade: &Cascade<A>) -> Result<Step<A>, Ignored> {
    if cascade.focused_index().is_none() {
        return Err(Ignored::NoFocus);
    }
    let node = config.node_at(&cascade.path).ok_or(Ignored::OutOfRange)?;
    match node {
        NodeRef::Child(MenuNode::Action(action)) => {
            if action.disabled.get() {
                return Err(Ignored::Disabled);
            }
            Ok(Step {
                state: MenuState::Closed,
                effect: Some(Effect::Invoke(action.clone())),
            })
        },
        NodeRef::Child(MenuNode::Divider) => Err(Ignored::Divider),
        _ => Err(Ignored::NotALeaf),
    }
}

/// Compute the state that follows `transition`.
///
/// Pure: actions are returned as an [Effect], never run.
pub fn step<A: Clone>(
    config: &MenuConfig,
    state: &MenuState<A>,
    options: &MenuBarOptions,
    transition: Transition<A>,
) -> Result<Step<A>, Ignored> {
    match transition {
        Transition::ClickTopLevel { index, anchor } => {
            let top = config.top_level(index).ok_or(Ignored::OutOfRange)?;
            if top.disabled.get() {
                return Err(Ignored::Disabled);
            }
            if state.path() == [index] {
                return Ok(Step::to(MenuState::Closed));
            }
            open_top_level(config, index, anchor)
        },
        Transition::OpenTopLevel { index, anchor } => {
            if state.path() == [index] {
                return Ok(Step::to(state.clone()));
            }
            open_top_level(config, index, anchor)
        },
        Transition::HoverTopLevel { index, anchor } => {
            if !state.is_open() && !options.hover_opens_from_closed {
                return Err(Ignored::HoverWhileClosed);
            }
            if state.top_level() == Some(index) {
                return Ok(Step::to(state.clone()));
            }
            open_top_level(config, index, anchor)
        },
        Transition::Expand { child, anchor } => expand(config, open_cascade(state)?, child, anchor),
        Transition::ExpandFocused { anchor } => {
            let cascade = open_cascade(state)?;
            let child = cascade.focused_index().ok_or(Ignored::NoFocus)?;
            let Step { state: expanded, .. } = expand(config, cascade, child, anchor)?;
            let MenuState::Open(mut cascade) = expanded else {
                return Err(Ignored::NothingOpen);
            };
            let submenu = deepest_submenu(config, &cascade)?;
            if let Some(first) = next_navigable(&submenu.items, None, true) {
                cascade.path.0.push(first);
            }
            Ok(Step::to(MenuState::Open(cascade)))
        },
        Transition::Focus { child } => focus(config, open_cascade(state)?, child),
        Transition::HoverItem { path, anchor } => {
            let (child, parent) = path.split_last().ok_or(Ignored::OutOfRange)?;
            let cascade = open_cascade(state)?;
            let node = config.node_at(&path).ok_or(Ignored::OutOfRange)?;
            // already showing this submenu: keep its own cascade intact
            if node.as_submenu().is_some()
                && cascade.open_levels() > path.len() - 1
                && cascade.path.starts_with(&path)
            {
                return Ok(Step::to(state.clone()));
            }
            let cascade = retarget(cascade, parent)?;
            match node.as_submenu() {
                Some(submenu) if submenu.is_openable() => expand(config, cascade, *child, anchor),
                _ => focus(config, cascade, *child),
            }
        },
        Transition::LeaveItem { path } => {
            let mut cascade = open_cascade(state)?;
            if cascade.focused() == Some(&path[..]) {
                let open = cascade.open_levels();
                cascade.truncate_to_open(open);
                return Ok(Step::to(MenuState::Open(cascade)));
            }
            Ok(Step::to(state.clone()))
        },
        Transition::ClickItem { path, anchor } => {
            let (child, parent) = path.split_last().ok_or(Ignored::OutOfRange)?;
            let cascade = open_cascade(state)?;
            let node = config.node_at(&path).ok_or(Ignored::OutOfRange)?;
            match node {
                NodeRef::Child(MenuNode::Submenu(_)) => {
                    if cascade.open_levels() > path.len() - 1 && cascade.path.starts_with(&path) {
                        return Ok(Step::to(state.clone()));
                    }
                    expand(config, retarget(cascade, parent)?, *child, anchor)
                },
                NodeRef::Child(MenuNode::Action(_)) => {
                    let Step { state: focused, .. } = focus(config, retarget(cascade, parent)?, *child)?;
                    let MenuState::Open(cascade) = focused else {
                        return Err(Ignored::NothingOpen);
                    };
                    activate(config, &cascade)
                },
                NodeRef::Child(MenuNode::Divider) => Err(Ignored::Divider),
                NodeRef::Child(MenuNode::Component(_)) => focus(config, retarget(cascade, parent)?, *child),
                NodeRef::TopLevel(_) => Err(Ignored::NotVisible),
            }
        },
        Transition::CollapseOne => {
            let mut cascade = open_cascade(state)?;
            let had_focus = cascade.focused().is_some();
            cascade.path.0.pop();
            let len = cascade.path.len();
            if len == 0 {
                return Ok(Step::to(MenuState::Closed));
            }
            // a focused item pops into its popup's trigger, otherwise the deepest popup closes
            let open = if had_focus { len - 1 } else { len };
            cascade.anchors.truncate(open.max(1));
            Ok(Step::to(MenuState::Open(cascade)))
        },
        Transition::ActivateLeaf => activate(config, &open_cascade(state)?),
        Transition::CloseAll => Ok(Step::to(MenuState::Closed)),
    }
}

/// What [MenuStateMachine::apply] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The state changed.
    Changed,
    /// An action ran and the cascade closed.
    Activated,
    /// The transition was valid but the state is the same.
    Unchanged,
    /// The transition was rejected.
    Ignored(Ignored),
}

impl Outcome {
    /// Returns `true` if the state changed.
    pub fn is_changed(self) -> bool {
        matches!(self, Outcome::Changed | Outcome::Activated)
    }
}

/// Single owner of a menu bar's [MenuState].
#[derive(Clone, Debug)]
pub struct MenuStateMachine<A> {
    state: MenuState<A>,
    options: MenuBarOptions,
}

impl<A: Clone> MenuStateMachine<A> {
    /// Start closed.
    pub fn new(options: MenuBarOptions) -> Self {
        Self {
            state: MenuState::Closed,
            options,
        }
    }

    /// Current state.
    pub fn state(&self) -> &MenuState<A> {
        &self.state
    }

    /// Options in effect.
    pub fn options(&self) -> &MenuBarOptions {
        &self.options
    }

    /// Replace the options.
    pub fn set_options(&mut self, options: MenuBarOptions) {
        self.options = options;
    }

    /// Apply a transition, commit the new state, then perform its effect.
    pub fn apply(&mut self, config: &MenuConfig, transition: Transition<A>) -> Outcome {
        let label = transition_name(&transition);
        match step(config, &self.state, &self.options, transition) {
            Ok(Step { state, effect }) => {
                let changed = !state.same_shape(&self.state);
                self.state = state;
                if changed {
                    log::debug!("{}: menu path is now {:?}", label, self.state.path());
                }
                let invoked = match effect {
                    Some(Effect::Invoke(action)) => action.invoke(),
                    None => false,
                };
                match (changed, invoked) {
                    (_, true) => Outcome::Activated,
                    (true, false) => Outcome::Changed,
                    (false, false) => Outcome::Unchanged,
                }
            },
            Err(reason) => {
                log::trace!("{} ignored: {:?}", label, reason);
                Outcome::Ignored(reason)
            },
        }
    }

    /// Click on a top-level trigger.
    pub fn click_top_level(&mut self, config: &MenuConfig, index: usize, anchor: Option<A>) -> Outcome {
        self.apply(config, Transition::ClickTopLevel { index, anchor })
    }

    /// Pointer entered a top-level trigger.
    pub fn hover_top_level(&mut self, config: &MenuConfig, index: usize, anchor: Option<A>) -> Outcome {
        self.apply(config, Transition::HoverTopLevel { index, anchor })
    }

    /// Open a child of the deepest open submenu.
    pub fn expand(&mut self, config: &MenuConfig, child: usize, anchor: Option<A>) -> Outcome {
        self.apply(config, Transition::Expand { child, anchor })
    }

    /// Ascend one level.
    pub fn collapse_one(&mut self, config: &MenuConfig) -> Outcome {
        self.apply(config, Transition::CollapseOne)
    }

    /// Activate the focused leaf.
    pub fn activate_leaf(&mut self, config: &MenuConfig) -> Outcome {
        self.apply(config, Transition::ActivateLeaf)
    }

    /// Close everything.
    pub fn close_all(&mut self) -> Outcome {
        if self.state.is_open() {
            log::debug!("Closing all menus");
            self.state = MenuState::Closed;
            Outcome::Changed
        } else {
            Outcome::Unchanged
        }
    }

    /// Drop a cascade that no longer resolves against `config`.
    pub fn revalidate(&mut self, config: &MenuConfig) -> Outcome {
        let valid = match &self.state {
            MenuState::Closed => true,
            MenuState::Open(cascade) => {
                cascade.path.is_valid_in(config)
                    && (1..=cascade.open_levels())
                        .all(|len| config.submenu_at(&cascade.path[..len]).is_some())
            },
        };
        if valid {
            Outcome::Unchanged
        } else {
            log::debug!("Open path no longer valid, closing");
            self.close_all()
        }
    }
}

fn transition_name<A>(transition: &Transition<A>) -> &'static str {
    match transition {
        Transition::ClickTopLevel { .. } => "click_top_level",
        Transition::OpenTopLevel { .. } => "open_top_level",
        Transition::HoverTopLevel { .. } => "hover_top_level",
        Transition::Expand { .. } => "expand",
        Transition::ExpandFocused { .. } => "expand_focused",
        Transition::Focus { .. } => "focus",
        Transition::HoverItem { .. } => "hover_item",
        Transition::LeaveItem { .. } => "leave_item",
        Transition::ClickItem { .. } => "click_item",
        Transition::CollapseOne => "collapse_one",
        Transition::ActivateLeaf => "activate_leaf",
        Transition::CloseAll => "close_all",
    }
}
