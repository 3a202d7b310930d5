// SPDX-License-Identifier: MIT OR Apache-2.0

use bitflags::bitflags;

bitflags! {
    /// What handling an input event did to the menu bar.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Update: u8 {
        /// The open cascade changed and must be redrawn.
        const DRAW = 0b0001;
        /// The event was consumed and should not propagate further.
        const CONSUMED = 0b0010;
        /// An action callback ran.
        const ACTION = 0b0100;
    }
}
