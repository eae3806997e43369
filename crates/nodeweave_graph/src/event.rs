// SPDX-License-Identifier: MIT OR Apache-2.0
//! Input events delivered to the canvas, one per tick.
//!
//! Pointer positions are in screen pixels relative to the canvas origin.
//! Modes convert them with [`crate::GraphCanvas::zoom_corrected`].

use egui::{Key, Modifiers, PointerButton, Pos2, Vec2};
use serde::{Deserialize, Serialize};

/// A single external event surfaced by the host
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A pointer button was pressed
    PointerDown {
        /// Pointer position
        pos: Pos2,
        /// Button pressed
        button: PointerButton,
        /// Modifiers held
        modifiers: Modifiers,
    },
    /// A pointer button was released
    PointerUp {
        /// Pointer position
        pos: Pos2,
        /// Button released
        button: PointerButton,
        /// Modifiers held
        modifiers: Modifiers,
    },
    /// The pointer moved with no button held
    PointerMove {
        /// Pointer position
        pos: Pos2,
        /// Movement since the previous pointer event
        delta: Vec2,
        /// Modifiers held
        modifiers: Modifiers,
    },
    /// The pointer moved with a button held
    PointerDrag {
        /// Pointer position
        pos: Pos2,
        /// Movement since the previous pointer event
        delta: Vec2,
        /// Button held
        button: PointerButton,
        /// Modifiers held
        modifiers: Modifiers,
    },
    /// The pointer left the canvas
    PointerLeft,
    /// Scroll wheel or trackpad scroll
    Scroll {
        /// Pointer position
        pos: Pos2,
        /// Scroll amount in points
        delta: Vec2,
        /// Modifiers held
        modifiers: Modifiers,
    },
    /// A key was pressed
    Key {
        /// Key pressed
        key: Key,
        /// Modifiers held
        modifiers: Modifiers,
    },
    /// The user picked an entry from a node context menu
    ContextAction {
        /// Action name of the chosen entry
        action: String,
        /// Pointer position when the menu was opened
        pos: Pos2,
    },
}

/// Payload-free discriminant of [`InputEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// See [`InputEvent::PointerDown`]
    PointerDown,
    /// See [`InputEvent::PointerUp`]
    PointerUp,
    /// See [`InputEvent::PointerMove`]
    PointerMove,
    /// See [`InputEvent::PointerDrag`]
    PointerDrag,
    /// See [`InputEvent::PointerLeft`]
    PointerLeft,
    /// See [`InputEvent::Scroll`]
    Scroll,
    /// See [`InputEvent::Key`]
    Key,
    /// See [`InputEvent::ContextAction`]
    ContextAction,
}

impl InputEvent {
    /// Get the event kind
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PointerDown { .. } => EventKind::PointerDown,
            Self::PointerUp { .. } => EventKind::PointerUp,
            Self::PointerMove { .. } => EventKind::PointerMove,
            Self::PointerDrag { .. } => EventKind::PointerDrag,
            Self::PointerLeft => EventKind::PointerLeft,
            Self::Scroll { .. } => EventKind::Scroll,
            Self::Key { .. } => EventKind::Key,
            Self::ContextAction { .. } => EventKind::ContextAction,
        }
    }

    /// Pointer position, if the event carries one
    pub fn pos(&self) -> Option<Pos2> {
        match self {
            Self::PointerDown { pos, .. }
            | Self::PointerUp { pos, .. }
            | Self::PointerMove { pos, .. }
            | Self::PointerDrag { pos, .. }
            | Self::Scroll { pos, .. }
            | Self::ContextAction { pos, .. } => Some(*pos),
            Self::PointerLeft | Self::Key { .. } => None,
        }
    }

    /// Pointer movement, if the event carries one
    pub fn delta(&self) -> Option<Vec2> {
        match self {
            Self::PointerMove { delta, .. } | Self::PointerDrag { delta, .. } => Some(*delta),
            _ => None,
        }
    }

    /// Modifiers held, or none for events without modifier state
    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerDrag { modifiers, .. }
            | Self::Scroll { modifiers, .. }
            | Self::Key { modifiers, .. } => *modifiers,
            Self::PointerLeft | Self::ContextAction { .. } => Modifiers::NONE,
        }
    }

    /// Check for a press of `button`
    pub fn is_press(&self, button: PointerButton) -> bool {
        matches!(self, Self::PointerDown { button: b, .. } if *b == button)
    }

    /// Check for a release of `button`
    pub fn is_release(&self, button: PointerButton) -> bool {
        matches!(self, Self::PointerUp { button: b, .. } if *b == button)
    }

    /// Check for a drag with `button` held
    pub fn is_drag(&self, button: PointerButton) -> bool {
        matches!(self, Self::PointerDrag { button: b, .. } if *b == button)
    }
}

/// A single modifier key, as named in bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModifierKey {
    /// Shift
    #[default]
    Shift,
    /// Ctrl, or Cmd on macOS
    Ctrl,
    /// Alt / Option
    Alt,
}

impl ModifierKey {
    /// Whether this modifier is held
    pub fn is_held(self, modifiers: Modifiers) -> bool {
        match self {
            Self::Shift => modifiers.shift,
            Self::Ctrl => modifiers.ctrl || modifiers.command,
            Self::Alt => modifiers.alt,
        }
    }
}
