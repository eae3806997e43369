// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dragging the current selection.

use crate::mode::{priority, InputMode, ModeCore};
use egui::PointerButton;
use nodeweave_graph::{EventKind, GraphCanvas, InputEvent};

/// Moves every selected node by the zoom-corrected pointer delta.
///
/// Activation requires the primary press to land in an already-selected
/// node. Node selection consumes that press, so the check looks at the kind
/// of event consumed this tick rather than at the live event; this mode must
/// therefore run after node selection.
pub struct SelectedNodeDragMode {
    core: ModeCore,
    snap: Option<f32>,
    press_on_selected: bool,
    moved: bool,
}

impl SelectedNodeDragMode {
    /// Create the mode
    pub fn new() -> Self {
        Self {
            core: ModeCore::new(priority::SELECTED_NODE_DRAG),
            snap: None,
            press_on_selected: false,
            moved: false,
        }
    }

    /// Snap moved nodes to a grid on release
    pub fn with_snap(mut self, grid: Option<f32>) -> Self {
        self.snap = grid.filter(|g| *g > 0.0);
        self
    }

    /// Recorded afresh every tick, so a press seen while the mode was held
    /// off never activates it later
    fn capture_press(&mut self, canvas: &GraphCanvas) {
        self.press_on_selected = canvas.selection_allowed()
            && canvas.used_event_kind() == Some(EventKind::PointerDown)
            && matches!(
                canvas.raw_event(),
                Some(InputEvent::PointerDown { pos, button: PointerButton::Primary, .. })
                    if canvas
                        .node_at(canvas.zoom_corrected(*pos))
                        .is_some_and(|id| canvas.graph.is_node_selected(id))
            );
    }
}

impl Default for SelectedNodeDragMode {
    fn default() -> Self {
        Self::new()
    }
}

impl InputMode for SelectedNodeDragMode {
    fn name(&self) -> &'static str {
        "SelectedNodeDragMode"
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
        self.press_on_selected && canvas.graph.selected_node_count() > 0
    }

    fn on_deactivated(&mut self, canvas: &mut GraphCanvas) {
        if let (Some(grid), true) = (self.snap, self.moved) {
            for id in canvas.graph.selected_nodes() {
                if let Some(node) = canvas.graph.node_mut(id) {
                    node.snap_to_grid(grid);
                }
            }
            canvas.request_repaint();
        }
        self.press_on_selected = false;
        self.moved = false;
    }

    fn before_editor_events(&mut self, canvas: &mut GraphCanvas) {
        self.capture_press(canvas);
        self.check_activation(canvas);
        if !self.is_activated() {
            return;
        }

        let selected = canvas.graph.selected_nodes();
        if selected.is_empty() {
            self.deactivate(canvas);
            return;
        }

        let Some(event) = canvas.event().cloned() else {
            return;
        };
        match event {
            InputEvent::PointerDrag {
                delta,
                button: PointerButton::Primary,
                ..
            } => {
                let delta = canvas.zoom_corrected_delta(delta);
                let mut moved = false;
                for id in selected {
                    if let Some(node) = canvas.graph.node_mut(id) {
                        moved |= node.drag(delta);
                    }
                }
                if moved {
                    self.moved = true;
                    canvas.use_event();
                    canvas.request_repaint();
                }
            }
            InputEvent::PointerUp {
                button: PointerButton::Primary,
                ..
            }
            | InputEvent::PointerLeft => self.deactivate(canvas),
            _ => {}
        }
    }
}
