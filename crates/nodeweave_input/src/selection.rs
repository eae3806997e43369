// SPDX-License-Identifier: MIT OR Apache-2.0
//! Click and chord selection.
//!
//! Every mode here is gated by the canvas `selection_allowed` flag, and
//! raises at most one selection notification per gesture.

use crate::bindings::KeyChord;
use crate::mode::{priority, InputMode, ModeCore};
use egui::PointerButton;
use nodeweave_graph::{GraphCanvas, InputEvent, ModifierKey};

/// Selects the node under a primary press
pub struct NodeSelectMode {
    core: ModeCore,
    multi_select: ModifierKey,
}

impl NodeSelectMode {
    /// Create the mode; `multi_select` toggles instead of replacing
    pub fn new(multi_select: ModifierKey) -> Self {
        Self {
            core: ModeCore::new(priority::NODE_SELECT),
            multi_select,
        }
    }
}

impl InputMode for NodeSelectMode {
    fn name(&self) -> &'static str {
        "NodeSelectMode"
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

    fn should_activate(&self, _canvas: &GraphCanvas) -> bool {
        true
    }

    fn before_editor_events(&mut self, canvas: &mut GraphCanvas) {
        self.check_activation(canvas);
        if !self.is_activated() {
            return;
        }
        let Some(InputEvent::PointerDown {
            pos,
            button: PointerButton::Primary,
            modifiers,
        }) = canvas.event().cloned()
        else {
            return;
        };
        let Some(node) = canvas.node_at(canvas.zoom_corrected(pos)) else {
            return;
        };

        let changed = if self.multi_select.is_held(modifiers) {
            canvas.graph.toggle_node(node)
        } else if !canvas.graph.is_node_selected(node) {
            canvas.graph.unselect_all();
            canvas.graph.select_node(node)
        } else {
            false
        };

        canvas.use_event();
        if changed {
            canvas.notify_selection_changed();
        }
    }
}

/// Selects the connector under a primary press
pub struct ConnectorSelectMode {
    core: ModeCore,
    multi_select: ModifierKey,
}

impl ConnectorSelectMode {
    /// Create the mode; `multi_select` toggles instead of replacing
    pub fn new(multi_select: ModifierKey) -> Self {
        Self {
            core: ModeCore::new(priority::CONNECTOR_SELECT),
            multi_select,
        }
    }
}

impl InputMode for ConnectorSelectMode {
    fn name(&self) -> &'static str {
        "ConnectorSelectMode"
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

    fn should_activate(&self, _canvas: &GraphCanvas) -> bool {
        true
    }

    fn before_editor_events(&mut self, canvas: &mut GraphCanvas) {
        self.check_activation(canvas);
        if !self.is_activated() {
            return;
        }
        let Some(InputEvent::PointerDown {
            pos,
            button: PointerButton::Primary,
            modifiers,
        }) = canvas.event().cloned()
        else {
            return;
        };
        let Some(connector) = canvas.connector_at(canvas.zoom_corrected(pos)) else {
            return;
        };

        let changed = if self.multi_select.is_held(modifiers) {
            canvas.graph.toggle_connector(connector)
        } else if !canvas.graph.is_connector_selected(connector) {
            canvas.graph.unselect_all();
            canvas.graph.select_connector(connector)
        } else {
            false
        };

        canvas.use_event();
        if changed {
            canvas.notify_selection_changed();
        }
    }
}

/// Clears the selection when a plain primary press hits empty canvas.
/// Leaves the press for later modes.
pub struct BackgroundClickedUnselector {
    core: ModeCore,
}

impl BackgroundClickedUnselector {
    /// Create the mode
    pub fn new() -> Self {
        Self {
            core: ModeCore::new(priority::BACKGROUND_UNSELECT),
        }
    }
}

impl Default for BackgroundClickedUnselector {
    fn default() -> Self {
        Self::new()
    }
}

impl InputMode for BackgroundClickedUnselector {
    fn name(&self) -> &'static str {
        "BackgroundClickedUnselector"
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

    fn should_activate(&self, _canvas: &GraphCanvas) -> bool {
        true
    }

    fn before_editor_events(&mut self, canvas: &mut GraphCanvas) {
        self.check_activation(canvas);
        if !self.is_activated() {
            return;
        }
        let Some(InputEvent::PointerDown {
            pos,
            button: PointerButton::Primary,
            modifiers,
        }) = canvas.event().cloned()
        else {
            return;
        };
        if !modifiers.is_none() {
            return;
        }
        let point = canvas.zoom_corrected(pos);
        if canvas.node_at(point).is_some() || canvas.connector_at(point).is_some() {
            return;
        }
        if canvas.graph.unselect_all() {
            canvas.notify_selection_changed();
        }
    }
}

/// Toggles between selecting every node and selecting none
pub struct SelectAllNodesMode {
    core: ModeCore,
    chord: KeyChord,
}

impl SelectAllNodesMode {
    /// Create the mode bound to `chord`
    pub fn new(chord: KeyChord) -> Self {
        Self {
            core: ModeCore::new(priority::SELECT_ALL),
            chord,
        }
    }
}

impl InputMode for SelectAllNodesMode {
    fn name(&self) -> &'static str {
        "SelectAllNodesMode"
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

    fn should_activate(&self, _canvas: &GraphCanvas) -> bool {
        true
    }

    fn before_editor_events(&mut self, canvas: &mut GraphCanvas) {
        self.check_activation(canvas);
        if !self.is_activated() {
            return;
        }
        if !canvas.event().is_some_and(|e| self.chord.matches_event(e)) {
            return;
        }

        let changed = if canvas.graph.all_nodes_selected() {
            canvas.graph.unselect_all_nodes()
        } else {
            canvas.graph.select_all_nodes()
        };

        canvas.use_event();
        if changed {
            canvas.notify_selection_changed();
        }
    }
}
