// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connecting the current selection to a clicked destination.

use crate::bindings::KeyChord;
use crate::connector::{self, ConnectorPolicies};
use crate::mode::{priority, InputMode, ModeCore};
use egui::{PointerButton, Pos2};
use nodeweave_graph::{ConnectorId, GraphCanvas, InputEvent, NodeId, Notification};
use serde::{Deserialize, Serialize};

/// Which selected nodes seed connectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStyle {
    /// Only the earliest selected node
    FirstSelected,
    /// Only the most recently selected node
    LastSelected,
    /// Every selected node
    #[default]
    AllSelected,
}

impl ConnectionStyle {
    /// Pick sources out of a selection ordered oldest first
    pub fn pick(self, selected: Vec<NodeId>) -> Vec<NodeId> {
        match self {
            Self::FirstSelected => selected.into_iter().take(1).collect(),
            Self::LastSelected => selected.last().copied().into_iter().collect(),
            Self::AllSelected => selected,
        }
    }
}

/// Opens one connector per eligible selected node, all ending at a shared
/// anchor under the pointer. The next primary click on a valid node becomes
/// the common destination; pairs failing the connection validator are
/// dropped and the rest are finalized together.
pub struct ConnectNodeInputMode {
    core: ModeCore,
    action: String,
    chord: Option<KeyChord>,
    style: ConnectionStyle,
    policies: ConnectorPolicies,
    anchor: Option<NodeId>,
    pending: Vec<(NodeId, ConnectorId)>,
    selection_was_allowed: Option<bool>,
}

impl ConnectNodeInputMode {
    /// Create the mode triggered by the context action `action`
    pub fn new(action: impl Into<String>, policies: ConnectorPolicies) -> Self {
        Self {
            core: ModeCore::new(priority::CONNECT_NODE),
            action: action.into(),
            chord: None,
            style: ConnectionStyle::default(),
            policies,
            anchor: None,
            pending: Vec::new(),
            selection_was_allowed: None,
        }
    }

    /// Also trigger on a key chord
    pub fn with_chord(mut self, chord: Option<KeyChord>) -> Self {
        self.chord = chord;
        self
    }

    /// Choose which selected nodes seed connectors
    pub fn with_style(mut self, style: ConnectionStyle) -> Self {
        self.style = style;
        self
    }

    /// Number of connectors waiting for a destination
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn is_trigger(&self, event: &InputEvent) -> bool {
        match event {
            InputEvent::ContextAction { action, .. } => *action == self.action,
            _ => self.chord.is_some_and(|c| c.matches_event(event)),
        }
    }

    /// Screen position for the anchor: the event's, else the first source's centre
    fn anchor_pos(canvas: &GraphCanvas, source: NodeId) -> Pos2 {
        canvas
            .raw_event()
            .and_then(InputEvent::pos)
            .or_else(|| {
                canvas
                    .node_rect(source)
                    .map(|r| (r.center().to_vec2() * canvas.state.zoom).to_pos2())
            })
            .unwrap_or_default()
    }

    fn discard(&mut self, canvas: &mut GraphCanvas) {
        let anchor = self.anchor.take();
        let pending = std::mem::take(&mut self.pending);
        if anchor.is_some() || !pending.is_empty() {
            connector::roll_back(canvas, pending.into_iter().map(|(_, id)| id), anchor);
        }
    }

    /// Forget connectors whose source or connector left the graph; if the
    /// anchor itself is gone, drop the whole gesture
    fn prune_lost(&mut self, canvas: &mut GraphCanvas) {
        if self.anchor.is_some_and(|id| !canvas.graph.contains_node(id)) {
            self.discard(canvas);
            return;
        }
        let before = self.pending.len();
        self.pending.retain(|(source, id)| {
            canvas.graph.contains_node(*source) && canvas.graph.connector(*id).is_some()
        });
        if self.pending.len() < before {
            tracing::debug!(lost = before - self.pending.len(), "pending connectors lost");
        }
    }

    fn finish(&mut self, canvas: &mut GraphCanvas, destination: NodeId) {
        let Some(anchor) = self.anchor.take() else {
            return;
        };
        let mut finalized = Vec::new();
        for (source, id) in std::mem::take(&mut self.pending) {
            if self.policies.is_valid_connection(canvas, source, destination) {
                if connector::complete_connector(canvas, id, anchor, destination) {
                    finalized.push(id);
                }
            } else {
                canvas.graph.remove_connector(id);
            }
        }
        canvas.graph.remove_node(anchor);
        if !finalized.is_empty() {
            tracing::info!(count = finalized.len(), "connectors finalized");
            canvas.notify(Notification::ConnectionsFinalized(finalized));
        }
        canvas.request_repaint();
    }
}

impl InputMode for ConnectNodeInputMode {
    fn name(&self) -> &'static str {
        "ConnectNodeInputMode"
    }

    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn should_activate(&self, canvas: &GraphCanvas) -> bool {
        canvas.event().is_some_and(|e| self.is_trigger(e))
    }

    fn on_activated(&mut self, canvas: &mut GraphCanvas) {
        canvas.use_event();
        let eligible: Vec<NodeId> = canvas
            .graph
            .selected_nodes()
            .into_iter()
            .filter(|id| self.policies.is_valid_node(canvas, *id))
            .collect();
        let sources = self.style.pick(eligible);
        let Some(first) = sources.first().copied() else {
            tracing::debug!("no eligible nodes to connect");
            return;
        };

        let anchor = connector::spawn_anchor(canvas, Self::anchor_pos(canvas, first));
        self.pending = sources
            .into_iter()
            .map(|source| (source, self.policies.open_connector(canvas, &[source, anchor])))
            .collect();
        self.anchor = Some(anchor);
        self.selection_was_allowed = Some(canvas.selection_allowed());
        canvas.set_selection_allowed(false);
        canvas.request_repaint();
    }

    fn on_cancelled(&mut self, canvas: &mut GraphCanvas) {
        self.discard(canvas);
    }

    fn on_deactivated(&mut self, canvas: &mut GraphCanvas) {
        self.discard(canvas);
        if let Some(allowed) = self.selection_was_allowed.take() {
            canvas.set_selection_allowed(allowed);
        }
    }

    fn before_editor_events(&mut self, canvas: &mut GraphCanvas) {
        self.check_activation(canvas);
        if !self.is_activated() {
            return;
        }
        self.prune_lost(canvas);
        let Some(anchor) = self.anchor.filter(|_| !self.pending.is_empty()) else {
            self.deactivate(canvas);
            return;
        };
        connector::follow_pointer(canvas, anchor);

        let Some(event) = canvas.event().cloned() else {
            return;
        };
        match event {
            InputEvent::PointerDown {
                pos,
                button: PointerButton::Primary,
                ..
            } => {
                canvas.use_event();
                if let Some(destination) = self.policies.valid_node_at(canvas, pos) {
                    self.finish(canvas, destination);
                    self.deactivate(canvas);
                }
            }
            InputEvent::PointerDown {
                button: PointerButton::Secondary,
                ..
            } => {
                canvas.use_event();
                self.cancel(canvas);
            }
            _ => {}
        }
    }
}
