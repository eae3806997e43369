// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas host: the graph plus the pan/zoom transform, the shared flags
//! input modes coordinate through, and the event of the current tick.
//!
//! Coordinates come in three flavours:
//! - screen: pixels relative to the canvas origin, as delivered in events
//! - zoom-corrected: screen / zoom; rendered node rects live here
//! - canvas: zoom-corrected minus pan; base node rects live here

use crate::connector::ConnectorId;
use crate::event::{EventKind, InputEvent, ModifierKey};
use crate::graph::{Graph, RectTest};
use crate::node::NodeId;
use egui::{PointerButton, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom factor
pub const MIN_ZOOM: f32 = 0.1;
/// Largest zoom factor
pub const MAX_ZOOM: f32 = 4.0;
/// Zoom change per scrolled point
const ZOOM_SENSITIVITY: f32 = 0.001;
/// Connector hit distance in screen pixels
const CONNECTOR_HIT_TOLERANCE: f32 = 6.0;

/// View transform and shared flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    /// Pan offset added to standard node rects
    pub pan: Vec2,
    /// Zoom factor
    pub zoom: f32,
    /// Whether scrolling zooms the canvas
    pub zoom_enabled: bool,
    /// Gate for every selection-family input mode
    pub selection_allowed: bool,
    /// Size of the visible canvas in screen pixels
    pub viewport: Vec2,
}

impl CanvasState {
    /// Create a state for a viewport of the given size
    pub fn new(viewport: Vec2) -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            zoom_enabled: true,
            selection_allowed: true,
            viewport,
        }
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new(Vec2::new(800.0, 600.0))
    }
}

/// Notifications raised by input modes for the outer application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The node or connector selection changed
    SelectionChanged,
    /// A gesture completed these connectors
    ConnectionsFinalized(Vec<ConnectorId>),
}

/// The graph together with its view state and the tick's event
pub struct GraphCanvas {
    /// Nodes and connectors
    pub graph: Graph,
    /// View transform and flags
    pub state: CanvasState,
    event: Option<InputEvent>,
    event_used: bool,
    used_event: Option<EventKind>,
    repaint_requests: u32,
    cancel_all_requested: bool,
    notifications: Vec<Notification>,
}

impl GraphCanvas {
    /// Create a canvas over an existing graph
    pub fn new(graph: Graph, viewport: Vec2) -> Self {
        Self {
            graph,
            state: CanvasState::new(viewport),
            event: None,
            event_used: false,
            used_event: None,
            repaint_requests: 0,
            cancel_all_requested: false,
            notifications: Vec::new(),
        }
    }

    // ========================================================================
    // Tick event
    // ========================================================================

    /// Install the event for a new tick
    pub fn begin_event(&mut self, event: InputEvent) {
        tracing::trace!(kind = ?event.kind(), "begin event");
        self.event = Some(event);
        self.event_used = false;
        self.used_event = None;
        self.repaint_requests = 0;
    }

    /// The tick's event, unless a mode already consumed it
    pub fn event(&self) -> Option<&InputEvent> {
        if self.event_used {
            None
        } else {
            self.event.as_ref()
        }
    }

    /// The tick's event whether or not it was consumed
    pub fn raw_event(&self) -> Option<&InputEvent> {
        self.event.as_ref()
    }

    /// Consume the tick's event
    pub fn use_event(&mut self) {
        if let Some(event) = &self.event {
            if !self.event_used {
                self.event_used = true;
                self.used_event = Some(event.kind());
            }
        }
    }

    /// Whether the tick's event has been consumed
    pub fn is_event_used(&self) -> bool {
        self.event_used
    }

    /// Kind of the event consumed during this tick
    pub fn used_event_kind(&self) -> Option<EventKind> {
        self.used_event
    }

    /// Zoom-corrected pointer position of the tick's event
    pub fn pointer_pos(&self) -> Option<Pos2> {
        self.event
            .as_ref()
            .and_then(InputEvent::pos)
            .map(|p| self.zoom_corrected(p))
    }

    // ========================================================================
    // Transform
    // ========================================================================

    /// Convert a screen position to zoom-corrected space
    pub fn zoom_corrected(&self, pos: Pos2) -> Pos2 {
        (pos.to_vec2() / self.state.zoom).to_pos2()
    }

    /// Convert a screen delta to zoom-corrected space
    pub fn zoom_corrected_delta(&self, delta: Vec2) -> Vec2 {
        delta / self.state.zoom
    }

    /// Convert a screen position to canvas space (pan removed)
    pub fn to_canvas(&self, pos: Pos2) -> Pos2 {
        self.zoom_corrected(pos) - self.state.pan
    }

    /// Centre of the visible area in zoom-corrected space
    pub fn visual_center(&self) -> Pos2 {
        (self.state.viewport / (2.0 * self.state.zoom)).to_pos2()
    }

    /// Set the pan offset
    pub fn set_pan(&mut self, pan: Vec2) {
        self.state.pan = pan;
        self.request_repaint();
    }

    /// Enable or disable wheel zoom
    pub fn set_zoom_enabled(&mut self, enabled: bool) {
        self.state.zoom_enabled = enabled;
    }

    /// Whether selection modes may run
    pub fn selection_allowed(&self) -> bool {
        self.state.selection_allowed
    }

    /// Gate selection modes
    pub fn set_selection_allowed(&mut self, allowed: bool) {
        self.state.selection_allowed = allowed;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Topmost selectable node under a zoom-corrected point
    pub fn node_at(&self, point: Pos2) -> Option<NodeId> {
        self.graph.node_at(point, self.state.pan)
    }

    /// Topmost selectable connector under a zoom-corrected point
    pub fn connector_at(&self, point: Pos2) -> Option<ConnectorId> {
        let tolerance = CONNECTOR_HIT_TOLERANCE / self.state.zoom;
        self.graph.connector_at(point, self.state.pan, tolerance)
    }

    /// Nodes matching a zoom-corrected rect
    pub fn nodes_in_rect(&self, rect: Rect, test: RectTest) -> Vec<NodeId> {
        self.graph.nodes_in_rect(rect, self.state.pan, test)
    }

    /// Connectors matching a zoom-corrected rect
    pub fn connectors_in_rect(&self, rect: Rect, test: RectTest) -> Vec<ConnectorId> {
        self.graph.connectors_in_rect(rect, self.state.pan, test)
    }

    /// Rendered rect of a node
    pub fn node_rect(&self, node_id: NodeId) -> Option<Rect> {
        self.graph.rendered_rect(node_id, self.state.pan)
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Ask the host to redraw
    pub fn request_repaint(&mut self) {
        self.repaint_requests += 1;
    }

    /// Number of repaint requests made during this tick
    pub fn repaint_requests(&self) -> u32 {
        self.repaint_requests
    }

    /// Whether anything asked for a redraw this tick
    pub fn needs_repaint(&self) -> bool {
        self.repaint_requests > 0
    }

    /// Queue a notification
    pub fn notify(&mut self, notification: Notification) {
        tracing::debug!(?notification, "canvas notification");
        self.notifications.push(notification);
    }

    /// Queue a selection change and ask for a redraw
    pub fn notify_selection_changed(&mut self) {
        self.notify(Notification::SelectionChanged);
        self.request_repaint();
    }

    /// Notifications queued and not yet drained
    pub fn pending_notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Drain queued notifications
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Ask the engine to cancel every active mode
    pub fn request_cancel_all(&mut self) {
        self.cancel_all_requested = true;
    }

    /// Take a pending cancel-all request
    pub fn take_cancel_all_request(&mut self) -> bool {
        std::mem::take(&mut self.cancel_all_requested)
    }

    // ========================================================================
    // Default handling
    // ========================================================================

    /// Pan and zoom for events no mode consumed
    pub fn handle_navigation(&mut self, pan_modifier: ModifierKey) {
        let Some(event) = self.event().cloned() else {
            return;
        };
        match event {
            InputEvent::PointerDrag {
                delta,
                button,
                modifiers,
                ..
            } if button == PointerButton::Middle
                || (button == PointerButton::Primary && pan_modifier.is_held(modifiers)) =>
            {
                let pan = self.state.pan + self.zoom_corrected_delta(delta);
                self.set_pan(pan);
                self.use_event();
            }
            InputEvent::Scroll { pos, delta, .. } if self.state.zoom_enabled => {
                let old_zoom = self.state.zoom;
                let new_zoom =
                    (old_zoom * (1.0 + delta.y * ZOOM_SENSITIVITY)).clamp(MIN_ZOOM, MAX_ZOOM);
                if new_zoom != old_zoom {
                    // Keep the canvas point under the pointer fixed
                    let p = pos.to_vec2();
                    self.state.pan += p / new_zoom - p / old_zoom;
                    self.state.zoom = new_zoom;
                    self.request_repaint();
                }
                self.use_event();
            }
            _ => {}
        }
    }
}

impl Default for GraphCanvas {
    fn default() -> Self {
        Self::new(Graph::default(), CanvasState::default().viewport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use egui::Modifiers;

    fn drag(delta: Vec2, button: PointerButton, modifiers: Modifiers) -> InputEvent {
        InputEvent::PointerDrag {
            pos: Pos2::new(100.0, 100.0),
            delta,
            button,
            modifiers,
        }
    }

    #[test]
    fn test_use_event_records_kind() {
        let mut canvas = GraphCanvas::default();
        canvas.begin_event(InputEvent::Key {
            key: egui::Key::A,
            modifiers: Modifiers::NONE,
        });
        assert!(canvas.event().is_some());
        canvas.use_event();
        assert!(canvas.event().is_none());
        assert!(canvas.raw_event().is_some());
        assert_eq!(canvas.used_event_kind(), Some(EventKind::Key));

        canvas.begin_event(InputEvent::PointerLeft);
        assert_eq!(canvas.used_event_kind(), None);
    }

    #[test]
    fn test_transform() {
        let mut canvas = GraphCanvas::default();
        canvas.state.zoom = 2.0;
        canvas.state.pan = Vec2::new(10.0, 0.0);
        assert_eq!(canvas.zoom_corrected(Pos2::new(40.0, 20.0)), Pos2::new(20.0, 10.0));
        assert_eq!(canvas.to_canvas(Pos2::new(40.0, 20.0)), Pos2::new(10.0, 10.0));
        assert_eq!(canvas.visual_center(), Pos2::new(200.0, 150.0));
    }

    #[test]
    fn test_middle_drag_pans() {
        let mut canvas = GraphCanvas::default();
        canvas.state.zoom = 2.0;
        canvas.begin_event(drag(Vec2::new(10.0, -4.0), PointerButton::Middle, Modifiers::NONE));
        canvas.handle_navigation(ModifierKey::Alt);
        assert_eq!(canvas.state.pan, Vec2::new(5.0, -2.0));
        assert!(canvas.is_event_used());
    }

    #[test]
    fn test_primary_drag_pans_only_with_modifier() {
        let mut canvas = GraphCanvas::default();
        canvas.begin_event(drag(Vec2::new(3.0, 3.0), PointerButton::Primary, Modifiers::NONE));
        canvas.handle_navigation(ModifierKey::Alt);
        assert_eq!(canvas.state.pan, Vec2::ZERO);

        canvas.begin_event(drag(Vec2::new(3.0, 3.0), PointerButton::Primary, Modifiers::ALT));
        canvas.handle_navigation(ModifierKey::Alt);
        assert_eq!(canvas.state.pan, Vec2::new(3.0, 3.0));
    }

    #[test]
    fn test_scroll_zoom_respects_flag() {
        let mut canvas = GraphCanvas::default();
        let scroll = InputEvent::Scroll {
            pos: Pos2::new(200.0, 100.0),
            delta: Vec2::new(0.0, 1000.0),
            modifiers: Modifiers::NONE,
        };

        canvas.set_zoom_enabled(false);
        canvas.begin_event(scroll.clone());
        canvas.handle_navigation(ModifierKey::Alt);
        assert_eq!(canvas.state.zoom, 1.0);
        assert!(!canvas.is_event_used());

        canvas.set_zoom_enabled(true);
        canvas.begin_event(scroll);
        let before = canvas.to_canvas(Pos2::new(200.0, 100.0));
        canvas.handle_navigation(ModifierKey::Alt);
        assert_eq!(canvas.state.zoom, 2.0);
        let after = canvas.to_canvas(Pos2::new(200.0, 100.0));
        assert!((before - after).length() < 1e-3);
    }

    #[test]
    fn test_hit_testing_uses_pan() {
        let mut canvas = GraphCanvas::default();
        let id = canvas
            .graph
            .add_node(Node::at(Pos2::new(0.0, 0.0), Vec2::splat(10.0)));
        canvas.state.pan = Vec2::new(50.0, 0.0);
        assert_eq!(canvas.node_at(Pos2::new(55.0, 5.0)), Some(id));
        assert_eq!(canvas.node_at(Pos2::new(5.0, 5.0)), None);
    }

    #[test]
    fn test_notifications_drain() {
        let mut canvas = GraphCanvas::default();
        canvas.begin_event(InputEvent::PointerLeft);
        canvas.notify_selection_changed();
        assert_eq!(canvas.repaint_requests(), 1);
        assert_eq!(canvas.take_notifications(), vec![Notification::SelectionChanged]);
        assert!(canvas.take_notifications().is_empty());
    }
}
