// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rubber-band selection.

use crate::mode::{priority, InputMode, ModeCore};
use egui::{Color32, PointerButton, Pos2, Rect, Shape, Stroke};
use nodeweave_graph::{GraphCanvas, InputEvent, ModifierKey, RectTest};

const FILL: Color32 = Color32::from_rgba_premultiplied(40, 70, 110, 40);
const OUTLINE: Color32 = Color32::from_rgb(100, 150, 220);

/// Selects everything inside a rectangle dragged from an empty-canvas press.
///
/// Zoom is disabled for the duration of the gesture. Leaving the canvas or
/// pressing another button cancels, which clears the selection.
pub struct BoxSelectMode {
    core: ModeCore,
    pan_modifier: ModifierKey,
    test: RectTest,
    include_connectors: bool,
    start: Option<Pos2>,
    rect: Option<Rect>,
    zoom_was_enabled: Option<bool>,
}

impl BoxSelectMode {
    /// Create the mode; presses with `pan_modifier` held are left to panning
    pub fn new(pan_modifier: ModifierKey) -> Self {
        Self {
            core: ModeCore::new(priority::BOX_SELECT),
            pan_modifier,
            test: RectTest::Overlap,
            include_connectors: false,
            start: None,
            rect: None,
            zoom_was_enabled: None,
        }
    }

    /// Set how the rectangle matches nodes
    pub fn with_test(mut self, test: RectTest) -> Self {
        self.test = test;
        self
    }

    /// Also select connectors
    pub fn with_connectors(mut self, include: bool) -> Self {
        self.include_connectors = include;
        self
    }

    /// Current selection rectangle in zoom-corrected space
    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    fn update_rect(&mut self, canvas: &GraphCanvas, pos: Pos2) {
        if let Some(start) = self.start {
            self.rect = Some(Rect::from_two_pos(start, canvas.zoom_corrected(pos)));
        }
    }

    fn finish(&mut self, canvas: &mut GraphCanvas) {
        let Some(rect) = self.rect else {
            return;
        };
        let mut selected = 0;
        for node in canvas.nodes_in_rect(rect, self.test) {
            if canvas.graph.select_node(node) {
                selected += 1;
            }
        }
        if self.include_connectors {
            for connector in canvas.connectors_in_rect(rect, self.test) {
                if canvas.graph.select_connector(connector) {
                    selected += 1;
                }
            }
        }
        tracing::debug!(selected, ?rect, "box selection finished");
        canvas.notify_selection_changed();
    }
}

impl InputMode for BoxSelectMode {
    fn name(&self) -> &'static str {
        "BoxSelectMode"
    }

    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn requires_selection_allowed(&self) -> bool {
        true
    }

    fn should_activate(&self, canvas: &GraphCanvas) -> bool {
        matches!(
            canvas.event(),
            Some(InputEvent::PointerDown { button: PointerButton::Primary, modifiers, .. })
                if !self.pan_modifier.is_held(*modifiers)
        )
    }

    fn on_activated(&mut self, canvas: &mut GraphCanvas) {
        self.zoom_was_enabled = Some(canvas.state.zoom_enabled);
        canvas.set_zoom_enabled(false);
        let start = canvas.pointer_pos().unwrap_or(Pos2::ZERO);
        self.start = Some(start);
        self.rect = Some(Rect::from_two_pos(start, start));
    }

    fn on_cancelled(&mut self, canvas: &mut GraphCanvas) {
        canvas.graph.unselect_all();
        canvas.notify_selection_changed();
    }

    fn on_deactivated(&mut self, canvas: &mut GraphCanvas) {
        if let Some(enabled) = self.zoom_was_enabled.take() {
            canvas.set_zoom_enabled(enabled);
        }
        self.start = None;
        self.rect = None;
        canvas.request_repaint();
    }

    fn before_editor_events(&mut self, canvas: &mut GraphCanvas) {
        self.check_activation(canvas);
        if !self.is_activated() {
            return;
        }
        let Some(event) = canvas.event().cloned() else {
            return;
        };
        match event {
            InputEvent::PointerDrag { pos, .. } | InputEvent::PointerMove { pos, .. } => {
                self.update_rect(canvas, pos);
                canvas.use_event();
                canvas.request_repaint();
            }
            InputEvent::PointerUp {
                pos,
                button: PointerButton::Primary,
                ..
            } => {
                self.update_rect(canvas, pos);
                self.finish(canvas);
                canvas.use_event();
                self.deactivate(canvas);
            }
            InputEvent::PointerLeft => self.cancel(canvas),
            InputEvent::PointerDown { button, .. } if button != PointerButton::Primary => {
                self.cancel(canvas);
                canvas.use_event();
            }
            _ => {}
        }
    }

    fn after_node_render(&mut self, canvas: &GraphCanvas, shapes: &mut Vec<Shape>) {
        let Some(rect) = self.rect else {
            return;
        };
        let zoom = canvas.state.zoom;
        let screen = Rect::from_min_max(
            (rect.min.to_vec2() * zoom).to_pos2(),
            (rect.max.to_vec2() * zoom).to_pos2(),
        );
        shapes.push(Shape::rect_filled(screen, 0.0, FILL));
        shapes.push(Shape::rect_stroke(screen, 0.0, Stroke::new(1.0, OUTLINE)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Modifiers, Vec2};
    use nodeweave_graph::{Connector, Node, NodeId, Notification};

    fn tick(mode: &mut BoxSelectMode, canvas: &mut GraphCanvas, event: InputEvent) {
        canvas.begin_event(event);
        mode.before_editor_events(canvas);
    }

    fn down(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerDown {
            pos: Pos2::new(x, y),
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    fn drag(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerDrag {
            pos: Pos2::new(x, y),
            delta: Vec2::ZERO,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    fn up(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerUp {
            pos: Pos2::new(x, y),
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    /// Inside, partially overlapping and outside a (0,0)-(100,100) box
    fn fixture() -> (GraphCanvas, [NodeId; 3]) {
        let mut canvas = GraphCanvas::default();
        let inside = canvas.graph.add_node(Node::at(Pos2::new(20.0, 20.0), Vec2::splat(20.0)));
        let partial = canvas.graph.add_node(Node::at(Pos2::new(90.0, 90.0), Vec2::splat(20.0)));
        let outside = canvas.graph.add_node(Node::at(Pos2::new(300.0, 300.0), Vec2::splat(20.0)));
        (canvas, [inside, partial, outside])
    }

    fn run_box(mode: &mut BoxSelectMode, canvas: &mut GraphCanvas) {
        tick(mode, canvas, down(0.0, 0.0));
        tick(mode, canvas, drag(50.0, 50.0));
        tick(mode, canvas, up(100.0, 100.0));
    }

    #[test]
    fn test_overlap_selects_partial_nodes() {
        let (mut canvas, [inside, partial, outside]) = fixture();
        let mut mode = BoxSelectMode::new(ModifierKey::Alt);
        run_box(&mut mode, &mut canvas);

        assert!(canvas.graph.is_node_selected(inside));
        assert!(canvas.graph.is_node_selected(partial));
        assert!(!canvas.graph.is_node_selected(outside));
        assert!(!mode.is_activated());
    }

    #[test]
    fn test_contained_selects_only_inner_nodes() {
        let (mut canvas, [inside, partial, outside]) = fixture();
        let mut mode = BoxSelectMode::new(ModifierKey::Alt).with_test(RectTest::Contained);
        run_box(&mut mode, &mut canvas);

        assert_eq!(canvas.graph.selected_nodes(), vec![inside]);
        assert!(!canvas.graph.is_node_selected(partial));
        assert!(!canvas.graph.is_node_selected(outside));
    }

    #[test]
    fn test_single_notification_per_gesture() {
        let (mut canvas, _) = fixture();
        let mut mode = BoxSelectMode::new(ModifierKey::Alt);
        run_box(&mut mode, &mut canvas);
        assert_eq!(canvas.take_notifications(), vec![Notification::SelectionChanged]);
    }

    #[test]
    fn test_zoom_disabled_during_gesture() {
        let (mut canvas, _) = fixture();
        let mut mode = BoxSelectMode::new(ModifierKey::Alt);

        tick(&mut mode, &mut canvas, down(0.0, 0.0));
        assert!(!canvas.state.zoom_enabled);
        tick(&mut mode, &mut canvas, drag(30.0, 40.0));
        assert_eq!(
            mode.rect(),
            Some(Rect::from_min_max(Pos2::ZERO, Pos2::new(30.0, 40.0)))
        );

        tick(&mut mode, &mut canvas, up(30.0, 40.0));
        assert!(canvas.state.zoom_enabled);
        assert_eq!(mode.rect(), None);
    }

    #[test]
    fn test_rect_is_zoom_corrected() {
        let (mut canvas, _) = fixture();
        canvas.state.zoom = 2.0;
        let mut mode = BoxSelectMode::new(ModifierKey::Alt);

        tick(&mut mode, &mut canvas, down(100.0, 20.0));
        tick(&mut mode, &mut canvas, drag(20.0, 100.0));
        assert_eq!(
            mode.rect(),
            Some(Rect::from_min_max(Pos2::new(10.0, 10.0), Pos2::new(50.0, 50.0)))
        );

        let mut shapes = Vec::new();
        mode.after_node_render(&canvas, &mut shapes);
        assert_eq!(shapes.len(), 2);
    }

    #[test]
    fn test_leaving_canvas_cancels() {
        let (mut canvas, [inside, ..]) = fixture();
        canvas.graph.select_node(inside);
        let mut mode = BoxSelectMode::new(ModifierKey::Alt).with_connectors(true);

        tick(&mut mode, &mut canvas, down(0.0, 0.0));
        tick(&mut mode, &mut canvas, drag(200.0, 200.0));
        tick(&mut mode, &mut canvas, InputEvent::PointerLeft);

        assert!(!mode.is_activated());
        assert_eq!(canvas.graph.selected_node_count(), 0);
        assert!(canvas.state.zoom_enabled);
    }

    #[test]
    fn test_other_button_cancels() {
        let (mut canvas, _) = fixture();
        let mut mode = BoxSelectMode::new(ModifierKey::Alt);

        tick(&mut mode, &mut canvas, down(0.0, 0.0));
        tick(
            &mut mode,
            &mut canvas,
            InputEvent::PointerDown {
                pos: Pos2::new(5.0, 5.0),
                button: PointerButton::Secondary,
                modifiers: Modifiers::NONE,
            },
        );
        tick(&mut mode, &mut canvas, up(200.0, 200.0));

        assert!(!mode.is_activated());
        assert_eq!(canvas.graph.selected_node_count(), 0);
    }

    #[test]
    fn test_pan_modifier_does_not_start_box() {
        let (mut canvas, _) = fixture();
        let mut mode = BoxSelectMode::new(ModifierKey::Alt);
        tick(
            &mut mode,
            &mut canvas,
            InputEvent::PointerDown {
                pos: Pos2::ZERO,
                button: PointerButton::Primary,
                modifiers: Modifiers::ALT,
            },
        );
        assert!(!mode.is_activated());
        assert!(canvas.state.zoom_enabled);
    }

    #[test]
    fn test_connectors_selected_when_enabled() {
        let (mut canvas, [inside, partial, _]) = fixture();
        let id = canvas.graph.add_connector(Connector::new(&[inside, partial]));
        let mut mode = BoxSelectMode::new(ModifierKey::Alt).with_connectors(true);
        run_box(&mut mode, &mut canvas);
        assert_eq!(canvas.graph.selected_connectors(), vec![id]);
    }
}
