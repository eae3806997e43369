// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyboard commands: delete, focus and cancel-all.

use crate::bindings::KeyChord;
use crate::mode::{priority, InputMode, ModeCore};
use egui::{Pos2, Vec2};
use nodeweave_graph::{GraphCanvas, NodeId};

/// Whether the tick's unconsumed event is `chord`
fn chord_pressed(canvas: &GraphCanvas, chord: &KeyChord) -> bool {
    canvas.event().is_some_and(|e| chord.matches_event(e))
}

// ============================================================================
// Delete
// ============================================================================

/// Removes the selected connectors and nodes
pub struct DeleteKeyInput {
    core: ModeCore,
    chord: KeyChord,
}

impl DeleteKeyInput {
    /// Create the mode bound to `chord`
    pub fn new(chord: KeyChord) -> Self {
        Self {
            core: ModeCore::new(priority::DELETE),
            chord,
        }
    }
}

impl InputMode for DeleteKeyInput {
    fn name(&self) -> &'static str {
        "DeleteKeyInput"
    }

    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn should_activate(&self, _canvas: &GraphCanvas) -> bool {
        true
    }

    fn before_editor_events(&mut self, canvas: &mut GraphCanvas) {
        self.check_activation(canvas);
        if !self.is_activated() || !chord_pressed(canvas, &self.chord) {
            return;
        }
        canvas.use_event();

        let connectors = canvas.graph.selected_connectors();
        let nodes = canvas.graph.selected_nodes();
        if connectors.is_empty() && nodes.is_empty() {
            return;
        }
        for id in &connectors {
            canvas.graph.remove_connector(*id);
        }
        for id in &nodes {
            canvas.graph.remove_node(*id);
        }
        tracing::debug!(
            nodes = nodes.len(),
            connectors = connectors.len(),
            "deleted selection"
        );
        canvas.notify_selection_changed();
    }
}

// ============================================================================
// Focus
// ============================================================================

/// Pans so the selection (or the whole graph) sits in the middle of the view
pub struct FocusInput {
    core: ModeCore,
    chord: KeyChord,
}

impl FocusInput {
    /// Create the mode bound to `chord`
    pub fn new(chord: KeyChord) -> Self {
        Self {
            core: ModeCore::new(priority::FOCUS),
            chord,
        }
    }

    /// Canvas-space centre of a pan-following node
    fn node_center(canvas: &GraphCanvas, id: NodeId) -> Option<Pos2> {
        let node = canvas.graph.node(id)?;
        if !node.follows_pan() {
            return None;
        }
        canvas.node_rect(id).map(|r| r.center() - canvas.state.pan)
    }

    /// Points to centre on: selected nodes, else selected connectors'
    /// midpoints, else every node
    fn focus_points(canvas: &GraphCanvas) -> Vec<Pos2> {
        let selected: Vec<Pos2> = canvas
            .graph
            .selected_nodes()
            .into_iter()
            .filter_map(|id| Self::node_center(canvas, id))
            .collect();
        if !selected.is_empty() {
            return selected;
        }

        let midpoints: Vec<Pos2> = canvas
            .graph
            .selected_connectors()
            .into_iter()
            .filter_map(|id| canvas.graph.connector(id)?.endpoints())
            .filter_map(|(a, b)| {
                let a = Self::node_center(canvas, a)?;
                let b = Self::node_center(canvas, b)?;
                Some(a.lerp(b, 0.5))
            })
            .collect();
        if !midpoints.is_empty() {
            return midpoints;
        }

        canvas
            .graph
            .node_ids()
            .filter_map(|id| Self::node_center(canvas, id))
            .collect()
    }
}

impl InputMode for FocusInput {
    fn name(&self) -> &'static str {
        "FocusInput"
    }

    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn should_activate(&self, _canvas: &GraphCanvas) -> bool {
        true
    }

    fn before_editor_events(&mut self, canvas: &mut GraphCanvas) {
        self.check_activation(canvas);
        if !self.is_activated() || !chord_pressed(canvas, &self.chord) {
            return;
        }
        canvas.use_event();

        if canvas.graph.node_count() == 0 {
            tracing::debug!("focus on empty graph");
            canvas.set_pan(Vec2::ZERO);
            return;
        }
        // Only fixed overlays left
        let points = Self::focus_points(canvas);
        if points.is_empty() {
            return;
        }
        let sum = points.iter().fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
        let centroid = sum / points.len() as f32;
        let pan = canvas.visual_center().to_vec2() - centroid;
        tracing::debug!(?pan, "focus");
        canvas.set_pan(pan);
    }
}

// ============================================================================
// Cancel all
// ============================================================================

/// Asks the engine to abort every gesture and clear the selection
pub struct CancelAll {
    core: ModeCore,
    chord: KeyChord,
}

impl CancelAll {
    /// Create the mode bound to `chord`
    pub fn new(chord: KeyChord) -> Self {
        Self {
            core: ModeCore::new(priority::CANCEL_ALL),
            chord,
        }
    }
}

impl InputMode for CancelAll {
    fn name(&self) -> &'static str {
        "CancelAll"
    }

    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn should_activate(&self, _canvas: &GraphCanvas) -> bool {
        true
    }

    fn before_editor_events(&mut self, canvas: &mut GraphCanvas) {
        self.check_activation(canvas);
        if !self.is_activated() || !chord_pressed(canvas, &self.chord) {
            return;
        }
        canvas.use_event();
        canvas.request_cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Key, Rect};
    use nodeweave_graph::{Connector, Node, Notification};

    fn tick(mode: &mut dyn InputMode, canvas: &mut GraphCanvas, chord: KeyChord) {
        canvas.begin_event(chord.to_event());
        mode.before_editor_events(canvas);
    }

    #[test]
    fn test_delete_removes_selection() {
        let mut canvas = GraphCanvas::default();
        let a = canvas.graph.add_node(Node::at(Pos2::ZERO, Vec2::splat(10.0)));
        let b = canvas.graph.add_node(Node::at(Pos2::new(50.0, 0.0), Vec2::splat(10.0)));
        let c = canvas.graph.add_node(Node::at(Pos2::new(100.0, 0.0), Vec2::splat(10.0)));
        let ab = canvas.graph.add_connector(Connector::new(&[a, b]));
        let bc = canvas.graph.add_connector(Connector::new(&[b, c]));
        canvas.graph.select_node(a);
        canvas.graph.select_connector(bc);

        let chord = KeyChord::key(Key::Delete);
        let mut mode = DeleteKeyInput::new(chord);
        tick(&mut mode, &mut canvas, chord);

        assert!(canvas.is_event_used());
        assert_eq!(canvas.graph.node_ids().collect::<Vec<_>>(), vec![b, c]);
        assert!(canvas.graph.connector(ab).is_none());
        assert!(canvas.graph.connector(bc).is_none());
        assert_eq!(canvas.take_notifications(), vec![Notification::SelectionChanged]);
    }

    #[test]
    fn test_delete_without_selection() {
        let mut canvas = GraphCanvas::default();
        canvas.graph.add_node(Node::at(Pos2::ZERO, Vec2::splat(10.0)));
        let chord = KeyChord::key(Key::Delete);
        let mut mode = DeleteKeyInput::new(chord);
        tick(&mut mode, &mut canvas, chord);

        assert!(canvas.is_event_used());
        assert_eq!(canvas.graph.node_count(), 1);
        assert!(canvas.take_notifications().is_empty());
    }

    #[test]
    fn test_focus_centres_selection() {
        let mut canvas = GraphCanvas::new(Default::default(), Vec2::splat(100.0));
        let a = canvas.graph.add_node(Node::at(Pos2::ZERO, Vec2::ZERO));
        let b = canvas.graph.add_node(Node::at(Pos2::new(10.0, 0.0), Vec2::ZERO));
        canvas.graph.add_node(Node::at(Pos2::new(500.0, 500.0), Vec2::ZERO));
        canvas.graph.select_node(a);
        canvas.graph.select_node(b);

        let chord = KeyChord::key(Key::F);
        let mut mode = FocusInput::new(chord);
        tick(&mut mode, &mut canvas, chord);

        assert_eq!(canvas.state.pan, Vec2::new(45.0, 50.0));
    }

    #[test]
    fn test_focus_fallbacks() {
        let chord = KeyChord::key(Key::F);
        let mut mode = FocusInput::new(chord);

        // Selected connector midpoint
        let mut canvas = GraphCanvas::new(Default::default(), Vec2::splat(100.0));
        let a = canvas.graph.add_node(Node::at(Pos2::ZERO, Vec2::ZERO));
        let b = canvas.graph.add_node(Node::at(Pos2::new(20.0, 20.0), Vec2::ZERO));
        let ab = canvas.graph.add_connector(Connector::new(&[a, b]));
        canvas.graph.select_connector(ab);
        tick(&mut mode, &mut canvas, chord);
        assert_eq!(canvas.state.pan, Vec2::new(40.0, 40.0));

        // Whole graph, ignoring fixed overlays
        let mut canvas = GraphCanvas::new(Default::default(), Vec2::splat(100.0));
        canvas.graph.add_node(Node::at(Pos2::new(10.0, 10.0), Vec2::ZERO));
        canvas
            .graph
            .add_node(Node::no_pan(Rect::from_min_size(Pos2::new(90.0, 90.0), Vec2::ZERO)));
        tick(&mut mode, &mut canvas, chord);
        assert_eq!(canvas.state.pan, Vec2::new(40.0, 40.0));

        // Empty graph
        let mut canvas = GraphCanvas::default();
        canvas.state.pan = Vec2::new(3.0, 4.0);
        tick(&mut mode, &mut canvas, chord);
        assert_eq!(canvas.state.pan, Vec2::ZERO);
    }

    #[test]
    fn test_focus_with_only_fixed_nodes_keeps_pan() {
        let mut canvas = GraphCanvas::new(Default::default(), Vec2::splat(100.0));
        canvas
            .graph
            .add_node(Node::no_pan(Rect::from_min_size(Pos2::new(90.0, 90.0), Vec2::ZERO)));
        canvas.state.pan = Vec2::new(3.0, 4.0);

        let chord = KeyChord::key(Key::F);
        let mut mode = FocusInput::new(chord);
        tick(&mut mode, &mut canvas, chord);

        assert!(canvas.is_event_used());
        assert_eq!(canvas.state.pan, Vec2::new(3.0, 4.0));
        assert_eq!(canvas.repaint_requests(), 0);
    }

    #[test]
    fn test_cancel_all_requests_and_consumes() {
        let mut canvas = GraphCanvas::default();
        let chord = KeyChord::key(Key::Escape);
        let mut mode = CancelAll::new(chord);
        tick(&mut mode, &mut canvas, chord);

        assert!(mode.is_activated());
        assert!(canvas.is_event_used());
        assert!(canvas.take_cancel_all_request());

        tick(&mut mode, &mut canvas, KeyChord::key(Key::A));
        assert!(!canvas.take_cancel_all_request());
    }
}
