// SPDX-License-Identifier: MIT OR Apache-2.0
//! The input mode contract.
//!
//! A mode is a self-contained interaction handler. The engine offers every
//! tick's event to each mode in ascending priority, first through
//! [`InputMode::before_editor_events`], then, after the host's own
//! navigation handling, through [`InputMode::after_editor_events`].
//!
//! Multi-tick gestures keep their state inside the mode; nothing blocks.

use egui::Shape;
use nodeweave_graph::GraphCanvas;

/// Default priorities of the built-in modes. Lower runs earlier.
pub mod priority {
    /// Escape hatch sees the cancel key first
    pub const CANCEL_ALL: i32 = -100;
    /// Delete key
    pub const DELETE: i32 = 0;
    /// Focus key
    pub const FOCUS: i32 = 0;
    /// Two-click connector gesture
    pub const CONNECTOR_MAKER: i32 = 10;
    /// Connect-from-selection gesture
    pub const CONNECT_NODE: i32 = 10;
    /// Node click selection
    pub const NODE_SELECT: i32 = 30;
    /// Connector click selection
    pub const CONNECTOR_SELECT: i32 = 31;
    /// Dragging selected nodes; must follow node selection
    pub const SELECTED_NODE_DRAG: i32 = 40;
    /// Clearing selection on background clicks
    pub const BACKGROUND_UNSELECT: i32 = 45;
    /// Select-all chord
    pub const SELECT_ALL: i32 = 46;
    /// Rubber-band selection
    pub const BOX_SELECT: i32 = 50;
}

/// Activation state shared by every mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeCore {
    activated: bool,
    priority: i32,
}

impl ModeCore {
    /// Create an inactive core
    pub fn new(priority: i32) -> Self {
        Self {
            activated: false,
            priority,
        }
    }

    /// Whether the mode is activated
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Ordering key
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Change the ordering key. Takes effect when the mode is registered.
    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    fn set_activated(&mut self, activated: bool) {
        self.activated = activated;
    }
}

/// An interaction handler with an activation lifecycle and ordered hooks.
///
/// Implementors provide the `on_*` hooks and the event hooks; the provided
/// `activate`/`deactivate`/`cancel`/`check_activation` methods implement the
/// lifecycle and should not be overridden.
pub trait InputMode {
    /// Name used in logs and engine lookups
    fn name(&self) -> &'static str;

    /// Activation state
    fn core(&self) -> &ModeCore;

    /// Mutable activation state
    fn core_mut(&mut self) -> &mut ModeCore;

    /// Ordering key
    fn priority(&self) -> i32 {
        self.core().priority()
    }

    /// Whether the mode is activated
    fn is_activated(&self) -> bool {
        self.core().is_activated()
    }

    /// Selection-family modes return true: they are held inactive while the
    /// canvas disallows selection.
    fn requires_selection_allowed(&self) -> bool {
        false
    }

    /// Mode-specific activation predicate, evaluated against the current event
    fn should_activate(&self, _canvas: &GraphCanvas) -> bool {
        false
    }

    /// Called on the inactive → activated transition
    fn on_activated(&mut self, _canvas: &mut GraphCanvas) {}

    /// Called on the activated → inactive transition
    fn on_deactivated(&mut self, _canvas: &mut GraphCanvas) {}

    /// Called when an activated mode is aborted, before it deactivates
    fn on_cancelled(&mut self, _canvas: &mut GraphCanvas) {}

    /// Activate; no-op if already activated
    fn activate(&mut self, canvas: &mut GraphCanvas) {
        if self.is_activated() {
            return;
        }
        tracing::debug!(mode = self.name(), "activated");
        self.on_activated(canvas);
        self.core_mut().set_activated(true);
    }

    /// Deactivate; no-op if not activated
    fn deactivate(&mut self, canvas: &mut GraphCanvas) {
        if !self.is_activated() {
            return;
        }
        tracing::debug!(mode = self.name(), "deactivated");
        self.on_deactivated(canvas);
        self.core_mut().set_activated(false);
    }

    /// Abort and deactivate; no-op if not activated
    fn cancel(&mut self, canvas: &mut GraphCanvas) {
        if !self.is_activated() {
            return;
        }
        tracing::debug!(mode = self.name(), "cancelled");
        self.on_cancelled(canvas);
        self.deactivate(canvas);
    }

    /// Activate if inactive and [`InputMode::should_activate`] holds.
    /// Selection-family modes are deactivated instead while selection is
    /// disallowed.
    fn check_activation(&mut self, canvas: &mut GraphCanvas) {
        if self.requires_selection_allowed() && !canvas.selection_allowed() {
            self.deactivate(canvas);
            return;
        }
        if !self.is_activated() && self.should_activate(canvas) {
            self.activate(canvas);
        }
    }

    /// Event hook run before the host's own handling
    fn before_editor_events(&mut self, _canvas: &mut GraphCanvas) {}

    /// Event hook run after the host's own handling
    fn after_editor_events(&mut self, _canvas: &mut GraphCanvas) {}

    /// Render hook for shapes drawn under the nodes
    fn before_node_render(&mut self, _canvas: &GraphCanvas, _shapes: &mut Vec<Shape>) {}

    /// Render hook for shapes drawn over the nodes
    fn after_node_render(&mut self, _canvas: &GraphCanvas, _shapes: &mut Vec<Shape>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting {
        core: ModeCore,
        activated: u32,
        deactivated: u32,
        cancelled: u32,
        gated: bool,
        wants: bool,
    }

    impl Counting {
        fn new() -> Self {
            Self {
                core: ModeCore::new(0),
                activated: 0,
                deactivated: 0,
                cancelled: 0,
                gated: false,
                wants: false,
            }
        }
    }

    impl InputMode for Counting {
        fn name(&self) -> &'static str {
            "Counting"
        }
        fn core(&self) -> &ModeCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut ModeCore {
            &mut self.core
        }
        fn requires_selection_allowed(&self) -> bool {
            self.gated
        }
        fn should_activate(&self, _canvas: &GraphCanvas) -> bool {
            self.wants
        }
        fn on_activated(&mut self, _canvas: &mut GraphCanvas) {
            self.activated += 1;
        }
        fn on_deactivated(&mut self, _canvas: &mut GraphCanvas) {
            self.deactivated += 1;
        }
        fn on_cancelled(&mut self, _canvas: &mut GraphCanvas) {
            self.cancelled += 1;
        }
    }

    #[test]
    fn test_activation_is_idempotent() {
        let mut canvas = GraphCanvas::default();
        let mut mode = Counting::new();

        mode.activate(&mut canvas);
        mode.activate(&mut canvas);
        assert_eq!(mode.activated, 1);
        assert!(mode.is_activated());

        mode.deactivate(&mut canvas);
        mode.deactivate(&mut canvas);
        assert_eq!(mode.deactivated, 1);
        assert!(!mode.is_activated());
    }

    #[test]
    fn test_cancel_implies_deactivate() {
        let mut canvas = GraphCanvas::default();
        let mut mode = Counting::new();

        mode.cancel(&mut canvas);
        assert_eq!(mode.cancelled, 0);

        mode.activate(&mut canvas);
        mode.cancel(&mut canvas);
        assert_eq!(mode.cancelled, 1);
        assert_eq!(mode.deactivated, 1);
        assert!(!mode.is_activated());
    }

    #[test]
    fn test_check_activation_is_lazy() {
        let mut canvas = GraphCanvas::default();
        let mut mode = Counting::new();

        mode.check_activation(&mut canvas);
        assert!(!mode.is_activated());

        mode.wants = true;
        mode.check_activation(&mut canvas);
        mode.check_activation(&mut canvas);
        assert_eq!(mode.activated, 1);
    }

    #[test]
    fn test_selection_gate_deactivates() {
        let mut canvas = GraphCanvas::default();
        let mut mode = Counting::new();
        mode.gated = true;
        mode.wants = true;

        mode.check_activation(&mut canvas);
        assert!(mode.is_activated());

        canvas.set_selection_allowed(false);
        mode.check_activation(&mut canvas);
        assert!(!mode.is_activated());
        mode.check_activation(&mut canvas);
        assert_eq!(mode.activated, 1);

        canvas.set_selection_allowed(true);
        mode.check_activation(&mut canvas);
        assert_eq!(mode.activated, 2);
    }
}
