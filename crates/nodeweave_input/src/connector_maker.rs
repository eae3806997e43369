// SPDX-License-Identifier: MIT OR Apache-2.0
//! Two-click connector creation.

use crate::bindings::KeyChord;
use crate::connector::{self, ConnectorPolicies};
use crate::mode::{priority, InputMode, ModeCore};
use egui::PointerButton;
use nodeweave_graph::{ConnectorId, GraphCanvas, InputEvent, NodeId, Notification};

/// A connector waiting for its second click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    start: NodeId,
    anchor: NodeId,
    connector: ConnectorId,
}

impl Pending {
    /// Whether every piece of the gesture is still in the graph
    fn is_intact(&self, canvas: &GraphCanvas) -> bool {
        canvas.graph.contains_node(self.start)
            && canvas.graph.contains_node(self.anchor)
            && canvas.graph.connector(self.connector).is_some()
    }
}

/// Builds connectors with two clicks while toggled on by its chord.
///
/// The first valid click opens a connector from the clicked node to an
/// anchor that follows the pointer; the second valid click replaces the
/// anchor with the clicked node. Right-click drops the pending connector.
/// While the mode is on, selection modes are held off.
pub struct ConnectorMakerMode {
    core: ModeCore,
    chord: KeyChord,
    policies: ConnectorPolicies,
    pending: Option<Pending>,
    selection_was_allowed: Option<bool>,
}

impl ConnectorMakerMode {
    /// Create the mode toggled by `chord`
    pub fn new(chord: KeyChord, policies: ConnectorPolicies) -> Self {
        Self {
            core: ModeCore::new(priority::CONNECTOR_MAKER),
            chord,
            policies,
            pending: None,
            selection_was_allowed: None,
        }
    }

    /// Whether a connector is waiting for its second click
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn abort(&mut self, canvas: &mut GraphCanvas) {
        if let Some(pending) = self.pending.take() {
            connector::roll_back(canvas, [pending.connector], Some(pending.anchor));
        }
    }

    fn click(&mut self, canvas: &mut GraphCanvas, target: Option<NodeId>) {
        match (self.pending, target) {
            (None, Some(start)) => {
                let pos = canvas.raw_event().and_then(InputEvent::pos).unwrap_or_default();
                let anchor = connector::spawn_anchor(canvas, pos);
                let connector = self.policies.open_connector(canvas, &[start, anchor]);
                self.pending = Some(Pending {
                    start,
                    anchor,
                    connector,
                });
                canvas.request_repaint();
            }
            (Some(pending), Some(end))
                if end != pending.anchor
                    && self.policies.is_valid_connection(canvas, pending.start, end) =>
            {
                self.pending = None;
                let done =
                    connector::complete_connector(canvas, pending.connector, pending.anchor, end);
                canvas.graph.remove_node(pending.anchor);
                if done {
                    tracing::info!(connector = ?pending.connector, "connector finalized");
                    canvas.notify(Notification::ConnectionsFinalized(vec![pending.connector]));
                }
                canvas.request_repaint();
            }
            _ => {}
        }
    }
}

impl InputMode for ConnectorMakerMode {
    fn name(&self) -> &'static str {
        "ConnectorMakerMode"
    }

    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn should_activate(&self, canvas: &GraphCanvas) -> bool {
        canvas.event().is_some_and(|e| self.chord.matches_event(e))
    }

    fn on_activated(&mut self, canvas: &mut GraphCanvas) {
        canvas.use_event();
        self.selection_was_allowed = Some(canvas.selection_allowed());
        canvas.set_selection_allowed(false);
    }

    fn on_cancelled(&mut self, canvas: &mut GraphCanvas) {
        self.abort(canvas);
    }

    fn on_deactivated(&mut self, canvas: &mut GraphCanvas) {
        self.abort(canvas);
        if let Some(allowed) = self.selection_was_allowed.take() {
            canvas.set_selection_allowed(allowed);
        }
    }

    fn before_editor_events(&mut self, canvas: &mut GraphCanvas) {
        self.check_activation(canvas);
        if !self.is_activated() {
            return;
        }
        if let Some(pending) = self.pending {
            if pending.is_intact(canvas) {
                connector::follow_pointer(canvas, pending.anchor);
            } else {
                tracing::debug!(start = ?pending.start, "pending connector lost its nodes");
                self.abort(canvas);
            }
        }
        let Some(event) = canvas.event().cloned() else {
            return;
        };
        match event {
            InputEvent::Key { .. } if self.chord.matches_event(&event) => {
                canvas.use_event();
                self.deactivate(canvas);
            }
            InputEvent::PointerDown {
                pos,
                button: PointerButton::Primary,
                ..
            } => {
                let target = self.policies.valid_node_at(canvas, pos);
                self.click(canvas, target);
                canvas.use_event();
            }
            InputEvent::PointerDown {
                button: PointerButton::Secondary,
                ..
            } if self.pending.is_some() => {
                self.abort(canvas);
                canvas.use_event();
            }
            _ => {}
        }
    }
}
