// SPDX-License-Identifier: MIT OR Apache-2.0
//! The menu bar controller
//!
//! [MenuBar] ties the pieces together: it owns the config, the state
//! machine and the published hotkey table, routes [InputEvent]s to
//! transitions, keeps the renderer in sync and keeps a global key listener
//! registered with the current shortcuts.
//!
//! Close triggers that arrive from outside the bar (a click elsewhere, focus
//! loss, a component asking to close) are deferred to [MenuBar::settle].
//! If anything opened during the same interaction, they are dropped, so a
//! click that both blurs the old target and opens a menu leaves it open.

use crate::config::MenuBarOptions;
use crate::menu::component::MenuCloser;
use crate::menu::error::ConfigError;
use crate::menu::hotkeys::{HotkeyTable, SharedHotkeys};
use crate::menu::navigation::{resolve, KeyInput};
use crate::menu::node::{MenuConfig, Submenu};
use crate::menu::render::{MenuRenderer, RenderBinding, RenderHints};
use crate::menu::state::{MenuState, MenuStateMachine, Outcome, Transition};
use crate::shortcut::{HotkeyCallback, KeyCombo, KeyListener};
use crate::update::Update;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What the pointer is over.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerTarget<A> {
    /// A top-level trigger.
    TopLevel {
        /// Top-level index.
        index: usize,
        /// Trigger handle.
        anchor: A,
    },
    /// An item inside an open popup.
    Item {
        /// Full node path.
        path: Vec<usize>,
        /// Item handle.
        anchor: A,
    },
    /// Anywhere outside the bar and its popups.
    Outside,
}

/// Raw input routed to a [MenuBar].
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent<A> {
    /// A pointer button went down.
    PointerDown(PointerTarget<A>),
    /// The pointer entered a target.
    PointerEnter(PointerTarget<A>),
    /// The pointer left a target.
    PointerLeave(PointerTarget<A>),
    /// A key went down.
    Key(KeyInput<A>),
    /// The bar lost keyboard focus.
    Blur,
    /// The bar gained keyboard focus.
    Focus,
}

/// No-op renderer for a bar that is driven headless.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl<A> MenuRenderer<A> for NullRenderer {
    fn open(&mut self, _path: &[usize], _anchor: Option<&A>, _submenu: &Submenu, _closer: &MenuCloser) {}

    fn close(&mut self, _path: &[usize]) {}

    fn close_all(&mut self) {}
}

/// An interactive menu bar.
pub struct MenuBar<A, R = NullRenderer> {
    config: MenuConfig,
    machine: MenuStateMachine<A>,
    renderer: R,
    hints: RenderHints,

    hotkeys: SharedHotkeys,
    hotkey_errors: Vec<ConfigError>,
    listener: Option<Box<dyn KeyListener + Send>>,
    registered: Vec<KeyCombo>,
    /// Mirrors `machine.state().is_open()` for listener callbacks.
    open_flag: Arc<AtomicBool>,

    closer: MenuCloser,
    hotkey_closer: MenuCloser,
    pending_outside: bool,
    pending_blur: bool,
    opened_in_frame: bool,
}

impl<A: Clone> MenuBar<A, NullRenderer> {
    /// Create a closed, unmounted menu bar.
    ///
    /// The hotkey table is built immediately; configuration errors are
    /// available from [MenuBar::hotkey_errors].
    pub fn new(config: impl Into<MenuConfig>, options: MenuBarOptions) -> Self {
        let config = config.into();
        let build = HotkeyTable::build(&config);
        for error in &build.errors {
            log::warn!("{}", error);
        }
        Self {
            config,
            machine: MenuStateMachine::new(options),
            renderer: NullRenderer,
            hints: RenderHints::default(),
            hotkeys: SharedHotkeys::new(build.table),
            hotkey_errors: build.errors,
            listener: None,
            registered: Vec::new(),
            open_flag: Arc::new(AtomicBool::new(false)),
            closer: MenuCloser::new(),
            hotkey_closer: MenuCloser::new(),
            pending_outside: false,
            pending_blur: false,
            opened_in_frame: false,
        }
    }
}

impl<A: Clone, R: MenuRenderer<A>> MenuBar<A, R> {
    /// Replace the renderer.
    pub fn with_renderer<R2: MenuRenderer<A>>(self, renderer: R2) -> MenuBar<A, R2> {
        MenuBar {
            config: self.config,
            machine: self.machine,
            renderer,
            hints: self.hints,
            hotkeys: self.hotkeys,
            hotkey_errors: self.hotkey_errors,
            listener: self.listener,
            registered: self.registered,
            open_flag: self.open_flag,
            closer: self.closer,
            hotkey_closer: self.hotkey_closer,
            pending_outside: self.pending_outside,
            pending_blur: self.pending_blur,
            opened_in_frame: self.opened_in_frame,
        }
    }

    /// Set the presentation hints handed to the renderer at mount.
    pub fn with_hints(mut self, hints: RenderHints) -> Self {
        self.hints = hints;
        self
    }

    /// Current state.
    pub fn state(&self) -> &MenuState<A> {
        self.machine.state()
    }

    /// Current config.
    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    /// Options in effect.
    pub fn options(&self) -> &MenuBarOptions {
        self.machine.options()
    }

    /// The renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Configuration errors found while building the current hotkey table.
    pub fn hotkey_errors(&self) -> &[ConfigError] {
        &self.hotkey_errors
    }

    /// The currently published hotkey table.
    pub fn hotkeys(&self) -> Arc<HotkeyTable> {
        self.hotkeys.load()
    }

    /// Handle for embedded components to request a close.
    pub fn closer(&self) -> MenuCloser {
        self.closer.clone()
    }

    /// Returns `true` while a key listener is attached.
    pub fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }

    /// Attach to a global key listener and configure the renderer.
    ///
    /// Every shortcut of the current table is registered. Registrations on
    /// a previously mounted listener move to the new one; the open path is
    /// kept.
    pub fn mount(&mut self, listener: impl KeyListener + Send + 'static) {
        self.unregister_all();
        self.listener = Some(Box::new(listener));
        self.renderer.configure(&self.hints);
        self.sync_registrations();
        log::debug!("Menu bar mounted with {} hotkeys", self.registered.len());
    }

    /// Detach from the key listener, unregistering every shortcut, and
    /// discard the open path.
    pub fn unmount(&mut self) {
        if let Some(mut listener) = self.listener.take() {
            for combo in self.registered.drain(..) {
                listener.unregister(&combo);
            }
        }
        self.registered.clear();
        self.close_all();
        self.clear_pending();
        log::debug!("Menu bar unmounted");
    }

    /// Replace the config.
    ///
    /// The hotkey table is rebuilt and swapped in atomically; only combos
    /// that appeared or disappeared are (un)registered. An open path that no
    /// longer resolves is closed, otherwise the open popups are repainted.
    pub fn set_config(&mut self, config: impl Into<MenuConfig>) {
        self.config = config.into();
        let build = HotkeyTable::build(&self.config);
        for error in &build.errors {
            log::warn!("{}", error);
        }
        self.hotkeys.swap(build.table);
        self.hotkey_errors = build.errors;
        self.sync_registrations();

        let before = self.machine.state().clone();
        if self.machine.revalidate(&self.config).is_changed() {
            RenderBinding::apply(&self.config, &before, self.machine.state(), &mut self.renderer, &self.closer);
            self.sync_open_flag();
        } else if self.machine.state().is_open() {
            RenderBinding::repaint(&self.config, self.machine.state(), &mut self.renderer, &self.closer);
        }
    }

    /// Replace the options, re-registering hotkeys if needed.
    pub fn set_options(&mut self, options: MenuBarOptions) {
        let rebind = options.close_on_hotkey != self.options().close_on_hotkey;
        self.machine.set_options(options);
        if rebind {
            self.unregister_all();
        }
        self.sync_registrations();
    }

    /// Handle one input event.
    ///
    /// Key events that reach the bar fire hotkeys directly: while closed a
    /// hotkey wins over navigation, while open navigation wins. Applications
    /// that also feed keys to a mounted listener should stop at whichever
    /// consumes the key first.
    pub fn handle(&mut self, event: InputEvent<A>) -> Update {
        match event {
            InputEvent::PointerDown(PointerTarget::TopLevel { index, anchor }) => {
                self.transition(Transition::ClickTopLevel {
                    index,
                    anchor: Some(anchor),
                }) | Update::CONSUMED
            },
            InputEvent::PointerDown(PointerTarget::Item { path, anchor }) => {
                self.transition(Transition::ClickItem {
                    path,
                    anchor: Some(anchor),
                }) | Update::CONSUMED
            },
            InputEvent::PointerDown(PointerTarget::Outside) => {
                if self.state().is_open() {
                    self.pending_outside = true;
                }
                Update::empty()
            },
            InputEvent::PointerEnter(PointerTarget::TopLevel { index, anchor }) => {
                self.transition(Transition::HoverTopLevel {
                    index,
                    anchor: Some(anchor),
                })
            },
            InputEvent::PointerEnter(PointerTarget::Item { path, anchor }) => {
                self.transition(Transition::HoverItem {
                    path,
                    anchor: Some(anchor),
                })
            },
            InputEvent::PointerLeave(PointerTarget::Item { path, .. }) => {
                self.transition(Transition::LeaveItem { path })
            },
            InputEvent::PointerEnter(PointerTarget::Outside)
            | InputEvent::PointerLeave(PointerTarget::TopLevel { .. } | PointerTarget::Outside) => Update::empty(),
            InputEvent::Key(input) => self.handle_key(input),
            InputEvent::Blur => {
                if self.state().is_open() {
                    self.pending_blur = true;
                }
                Update::empty()
            },
            InputEvent::Focus => {
                self.pending_blur = false;
                Update::empty()
            },
        }
    }

    /// Run the trailing check that ends an interaction.
    ///
    /// Pending outside clicks and blurs close the cascade unless a menu
    /// opened since the last settle. Close requests from components and
    /// listener-fired hotkeys are always honoured.
    pub fn settle(&mut self) -> Update {
        let component_close = self.closer.take_request();
        let hotkey_close = self.hotkey_closer.take_request() && self.options().close_on_hotkey;
        let external = (self.pending_outside || self.pending_blur) && !self.opened_in_frame;
        self.clear_pending();

        if (component_close || hotkey_close || external) && self.state().is_open() {
            log::trace!(
                "Trailing close (component: {}, hotkey: {}, outside/blur: {})",
                component_close,
                hotkey_close,
                external
            );
            self.close_all()
        } else {
            Update::empty()
        }
    }

    /// Handle a whole interaction, then settle.
    pub fn dispatch(&mut self, events: impl IntoIterator<Item = InputEvent<A>>) -> Update {
        let update = events
            .into_iter()
            .fold(Update::empty(), |update, event| update | self.handle(event));
        update | self.settle()
    }

    /// Close everything.
    pub fn close_all(&mut self) -> Update {
        let before = self.machine.state().clone();
        if self.machine.close_all().is_changed() {
            RenderBinding::apply(&self.config, &before, self.machine.state(), &mut self.renderer, &self.closer);
            self.sync_open_flag();
            Update::DRAW
        } else {
            Update::empty()
        }
    }

    fn handle_key(&mut self, input: KeyInput<A>) -> Update {
        let combo = input.event.combo();
        if !self.state().is_open() {
            if let Some(ran) = self.fire_hotkey(&combo) {
                return hotkey_update(ran);
            }
            return match resolve(&self.config, self.state(), input) {
                Some(transition) => self.transition(transition) | Update::CONSUMED,
                None => Update::empty(),
            };
        }

        if let Some(transition) = resolve(&self.config, self.state(), input) {
            return self.transition(transition) | Update::CONSUMED;
        }
        if combo.is_navigation() {
            return Update::CONSUMED;
        }
        if let Some(ran) = self.fire_hotkey(&combo) {
            let mut update = hotkey_update(ran);
            if ran && self.options().close_on_hotkey {
                update |= self.close_all();
            }
            return update;
        }
        Update::empty()
    }

    /// `None` when hotkeys are off or the combo is unbound.
    fn fire_hotkey(&self, combo: &KeyCombo) -> Option<bool> {
        if !self.options().hotkeys_enabled {
            return None;
        }
        self.hotkeys.fire(combo)
    }

    fn transition(&mut self, transition: Transition<A>) -> Update {
        let before = self.machine.state().clone();
        let outcome = self.machine.apply(&self.config, transition);
        if !outcome.is_changed() {
            return Update::empty();
        }

        let after = self.machine.state();
        if let (Some(new), old) = (after.cascade(), before.cascade()) {
            let grew = match old {
                None => true,
                Some(old) => old.path().first() != new.path().first() || new.open_levels() > old.open_levels(),
            };
            self.opened_in_frame |= grew;
        }
        RenderBinding::apply(&self.config, &before, self.machine.state(), &mut self.renderer, &self.closer);
        self.sync_open_flag();

        match outcome {
            Outcome::Activated => Update::DRAW | Update::ACTION,
            _ => Update::DRAW,
        }
    }

    fn sync_open_flag(&self) {
        self.open_flag.store(self.machine.state().is_open(), Ordering::Release);
    }

    fn clear_pending(&mut self) {
        self.pending_outside = false;
        self.pending_blur = false;
        self.opened_in_frame = false;
    }

    fn unregister_all(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            for combo in self.registered.drain(..) {
                listener.unregister(&combo);
            }
        }
    }

    fn sync_registrations(&mut self) {
        let Some(listener) = self.listener.as_mut() else {
            return;
        };
        let wanted: Vec<KeyCombo> = if self.machine.options().hotkeys_enabled {
            self.hotkeys.load().combos().copied().collect()
        } else {
            Vec::new()
        };

        self.registered.retain(|combo| {
            let keep = wanted.contains(combo);
            if !keep {
                log::trace!("Unregistering hotkey {}", combo);
                listener.unregister(combo);
            }
            keep
        });
        for combo in wanted {
            if self.registered.contains(&combo) {
                continue;
            }
            log::trace!("Registering hotkey {}", combo);
            let callback = listener_callback(
                combo,
                self.hotkeys.clone(),
                self.open_flag.clone(),
                self.hotkey_closer.clone(),
            );
            listener.register(combo, callback);
            self.registered.push(combo);
        }
    }
}

/// Callback registered with the global listener for one combination.
///
/// The binding is looked up at fire time, so a config swap never leaves a
/// stale action behind. Navigation keys are declined while a menu is open.
fn listener_callback(
    combo: KeyCombo,
    hotkeys: SharedHotkeys,
    open_flag: Arc<AtomicBool>,
    closer: MenuCloser,
) -> HotkeyCallback {
    Arc::new(move || {
        let open = open_flag.load(Ordering::Acquire);
        if open && combo.is_navigation() {
            return false;
        }
        let Some(ran) = hotkeys.fire(&combo) else {
            return false;
        };
        if ran && open {
            closer.request_close();
        }
        true
    })
}

fn hotkey_update(ran: bool) -> Update {
    if ran {
        Update::ACTION | Update::CONSUMED
    } else {
        Update::CONSUMED
    }
}
