// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared machinery for the connector-building modes.
//!
//! Both gestures open connectors towards a transient anchor node that
//! follows the pointer, then either swap the anchor for a real destination
//! or roll everything back.

use egui::Pos2;
use nodeweave_graph::{Connector, ConnectorId, GraphCanvas, InputEvent, Node, NodeId};

/// Decides whether a node may take part in a connection
pub type NodeValidator = Box<dyn Fn(&Node) -> bool>;
/// Decides whether a (source, destination) pair may be connected
pub type ConnectionValidator = Box<dyn Fn(&Node, &Node) -> bool>;
/// Builds a connector through the given nodes
pub type ConnectorFactory = Box<dyn Fn(&[NodeId]) -> Connector>;

/// Pluggable policies of a connector-building mode
pub struct ConnectorPolicies {
    node_validator: NodeValidator,
    connection_validator: ConnectionValidator,
    factory: ConnectorFactory,
}

impl ConnectorPolicies {
    /// Accept every node and pair; build plain connectors
    pub fn new() -> Self {
        Self {
            node_validator: Box::new(|_: &Node| true),
            connection_validator: Box::new(|_: &Node, _: &Node| true),
            factory: Box::new(Connector::new),
        }
    }

    /// Replace the node validator
    pub fn with_node_validator(mut self, validator: impl Fn(&Node) -> bool + 'static) -> Self {
        self.node_validator = Box::new(validator);
        self
    }

    /// Replace the connection validator
    pub fn with_connection_validator(
        mut self,
        validator: impl Fn(&Node, &Node) -> bool + 'static,
    ) -> Self {
        self.connection_validator = Box::new(validator);
        self
    }

    /// Replace the connector factory
    pub fn with_factory(mut self, factory: impl Fn(&[NodeId]) -> Connector + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    /// Whether `node` passes the node validator
    pub fn is_valid_node(&self, canvas: &GraphCanvas, node: NodeId) -> bool {
        canvas
            .graph
            .node(node)
            .is_some_and(|n| (self.node_validator)(n))
    }

    /// Whether `from → to` passes the connection validator
    pub fn is_valid_connection(&self, canvas: &GraphCanvas, from: NodeId, to: NodeId) -> bool {
        match (canvas.graph.node(from), canvas.graph.node(to)) {
            (Some(from), Some(to)) => (self.connection_validator)(from, to),
            _ => false,
        }
    }

    /// Valid node under the event's pointer
    pub fn valid_node_at(&self, canvas: &GraphCanvas, pos: Pos2) -> Option<NodeId> {
        canvas
            .node_at(canvas.zoom_corrected(pos))
            .filter(|id| self.is_valid_node(canvas, *id))
    }

    /// Build a connector through `nodes` and add it to the graph
    pub fn open_connector(&self, canvas: &mut GraphCanvas, nodes: &[NodeId]) -> ConnectorId {
        canvas.graph.add_connector((self.factory)(nodes))
    }
}

impl Default for ConnectorPolicies {
    fn default() -> Self {
        Self::new()
    }
}

/// Add a pointer-following anchor at the screen position `pos`
pub(crate) fn spawn_anchor(canvas: &mut GraphCanvas, pos: Pos2) -> NodeId {
    let position = canvas.to_canvas(pos);
    canvas.graph.add_node(Node::anchor(position))
}

/// Move `anchor` to the pointer if the event moved it
pub(crate) fn follow_pointer(canvas: &mut GraphCanvas, anchor: NodeId) {
    let Some(InputEvent::PointerMove { pos, .. } | InputEvent::PointerDrag { pos, .. }) =
        canvas.raw_event().cloned()
    else {
        return;
    };
    let position = canvas.to_canvas(pos);
    if let Some(node) = canvas.graph.node_mut(anchor) {
        node.set_position(position);
        canvas.request_repaint();
    }
}

/// Swap `anchor` for `destination` in a pending connector. Returns false,
/// after removing the connector, if nothing usable is left.
pub(crate) fn complete_connector(
    canvas: &mut GraphCanvas,
    connector: ConnectorId,
    anchor: NodeId,
    destination: NodeId,
) -> bool {
    let usable = canvas.graph.connector_mut(connector).is_some_and(|c| {
        c.replace_node(anchor, destination);
        !c.is_dangling()
    });
    if !usable {
        canvas.graph.remove_connector(connector);
    }
    usable
}

/// Remove unfinished connectors and the anchor
pub(crate) fn roll_back(
    canvas: &mut GraphCanvas,
    connectors: impl IntoIterator<Item = ConnectorId>,
    anchor: Option<NodeId>,
) {
    let mut removed = 0;
    for id in connectors {
        if canvas.graph.remove_connector(id).is_some() {
            removed += 1;
        }
    }
    if let Some(anchor) = anchor {
        canvas.graph.remove_node(anchor);
    }
    tracing::debug!(removed, "rolled back pending connectors");
    canvas.request_repaint();
}
