// SPDX-License-Identifier: MIT OR Apache-2.0
//! Embedded widgets inside menus.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An externally supplied widget hosted inside a menu.
///
/// The engine never activates a component or closes the cascade on its
/// behalf. A component that wants the menu gone calls
/// [MenuCloser::request_close] on the closer it was handed when its submenu
/// was opened.
pub trait MenuComponent: Send + Sync {
    /// Name used for diagnostics.
    fn name(&self) -> &str;

    /// Called by the renderer when the submenu hosting this component opens.
    fn attach(&self, _closer: MenuCloser) {}
}

/// Handle through which embedded widgets ask the menu bar to close.
///
/// Requests are queued and honoured at the menu bar's next settle point, so a
/// widget may call this from inside its own event handler.
#[derive(Clone, Debug, Default)]
pub struct MenuCloser {
    requested: Arc<AtomicBool>,
}

impl MenuCloser {
    /// Create a closer with no pending request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for the whole cascade to close.
    pub fn request_close(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Take the pending request, clearing it.
    pub fn take_request(&self) -> bool {
        self.requested.swap(false, Ordering::AcqRel)
    }

    /// Whether a request is pending.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
