// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ordered dispatch of events and render passes to input modes.

use crate::auxiliary::{CancelAll, DeleteKeyInput, FocusInput};
use crate::bindings::InputBindings;
use crate::box_select::BoxSelectMode;
use crate::connect_node::ConnectNodeInputMode;
use crate::connector::ConnectorPolicies;
use crate::connector_maker::ConnectorMakerMode;
use crate::drag::SelectedNodeDragMode;
use crate::mode::InputMode;
use crate::selection::{
    BackgroundClickedUnselector, ConnectorSelectMode, NodeSelectMode, SelectAllNodesMode,
};
use egui::Shape;
use nodeweave_graph::{GraphCanvas, InputEvent, ModifierKey, Notification};

/// Shapes produced by one render pass
#[derive(Debug, Default)]
pub struct RenderLayers {
    /// Drawn before the nodes
    pub underlay: Vec<Shape>,
    /// Drawn after the nodes
    pub overlay: Vec<Shape>,
}

/// Owns the registered modes and drives them in priority order
pub struct InputEngine {
    modes: Vec<Box<dyn InputMode>>,
    pan_modifier: ModifierKey,
}

impl InputEngine {
    /// Create an engine with no modes
    pub fn new(pan_modifier: ModifierKey) -> Self {
        Self {
            modes: Vec::new(),
            pan_modifier,
        }
    }

    /// Create an engine with every built-in mode, accepting every connection
    pub fn with_default_modes(bindings: &InputBindings) -> Self {
        Self::with_policies(bindings, ConnectorPolicies::default(), ConnectorPolicies::default())
    }

    /// Create an engine with every built-in mode and the given connector
    /// policies for the two-click and connect-from-selection gestures
    pub fn with_policies(
        bindings: &InputBindings,
        maker: ConnectorPolicies,
        connect: ConnectorPolicies,
    ) -> Self {
        let mut engine = Self::new(bindings.pan_modifier);
        engine.add_mode(CancelAll::new(bindings.cancel));
        engine.add_mode(DeleteKeyInput::new(bindings.delete));
        engine.add_mode(FocusInput::new(bindings.focus));
        engine.add_mode(ConnectorMakerMode::new(bindings.connector_maker, maker));
        engine.add_mode(
            ConnectNodeInputMode::new(bindings.connect_action.clone(), connect)
                .with_chord(bindings.connect_selected)
                .with_style(bindings.connection_style),
        );
        engine.add_mode(NodeSelectMode::new(bindings.multi_select));
        engine.add_mode(ConnectorSelectMode::new(bindings.multi_select));
        engine.add_mode(SelectedNodeDragMode::new().with_snap(bindings.drag_snap));
        engine.add_mode(BackgroundClickedUnselector::new());
        engine.add_mode(SelectAllNodesMode::new(bindings.select_all));
        engine.add_mode(
            BoxSelectMode::new(bindings.pan_modifier)
                .with_test(bindings.box_select_test)
                .with_connectors(bindings.box_select_connectors),
        );
        engine
    }

    /// Register a mode. Modes of equal priority keep registration order.
    pub fn add_mode(&mut self, mode: impl InputMode + 'static) {
        tracing::debug!(mode = mode.name(), priority = mode.priority(), "registered mode");
        self.modes.push(Box::new(mode));
        self.modes.sort_by_key(|m| m.priority());
    }

    /// Names of the registered modes in dispatch order
    pub fn mode_names(&self) -> Vec<&'static str> {
        self.modes.iter().map(|m| m.name()).collect()
    }

    /// Whether the named mode is currently activated
    pub fn is_mode_active(&self, name: &str) -> bool {
        self.modes
            .iter()
            .any(|m| m.name() == name && m.is_activated())
    }

    /// Run one tick. Returns whether any mode or the host consumed the event.
    pub fn process(&mut self, canvas: &mut GraphCanvas, event: InputEvent) -> bool {
        canvas.begin_event(event);

        for index in 0..self.modes.len() {
            self.modes[index].before_editor_events(canvas);
            self.serve_cancel_request(canvas, Some(index));
        }

        canvas.handle_navigation(self.pan_modifier);

        for index in 0..self.modes.len() {
            self.modes[index].after_editor_events(canvas);
            self.serve_cancel_request(canvas, Some(index));
        }

        canvas.is_event_used()
    }

    /// Collect overlay shapes. Underlays run in dispatch order, overlays in
    /// reverse so the earliest mode draws on top.
    pub fn render(&mut self, canvas: &GraphCanvas) -> RenderLayers {
        let mut layers = RenderLayers::default();
        for mode in &mut self.modes {
            mode.before_node_render(canvas, &mut layers.underlay);
        }
        for mode in self.modes.iter_mut().rev() {
            mode.after_node_render(canvas, &mut layers.overlay);
        }
        layers
    }

    /// Abort every active gesture and clear the selection
    pub fn cancel_all(&mut self, canvas: &mut GraphCanvas) {
        self.cancel_except(canvas, None);
    }

    fn serve_cancel_request(&mut self, canvas: &mut GraphCanvas, requester: Option<usize>) {
        if canvas.take_cancel_all_request() {
            self.cancel_except(canvas, requester);
        }
    }

    fn cancel_except(&mut self, canvas: &mut GraphCanvas, requester: Option<usize>) {
        let queued = canvas.pending_notifications().len();
        let mut cancelled = 0;
        for (index, mode) in self.modes.iter_mut().enumerate() {
            if Some(index) != requester && mode.is_activated() {
                mode.cancel(canvas);
                cancelled += 1;
            }
        }
        canvas.graph.unselect_all();
        // A cancelled mode may already have reported the selection change
        let reported = canvas.pending_notifications()[queued..]
            .contains(&Notification::SelectionChanged);
        if reported {
            canvas.request_repaint();
        } else {
            canvas.notify_selection_changed();
        }
        tracing::debug!(cancelled, "cancelled all modes");
    }
}

impl Default for InputEngine {
    fn default() -> Self {
        Self::with_default_modes(&InputBindings::default())
    }
}
