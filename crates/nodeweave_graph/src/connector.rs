// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connector (edge) definitions for the graph.

use crate::node::NodeId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectorId(pub Uuid);

impl ConnectorId {
    /// Create a new random connector ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectorId {
    fn default() -> Self {
        Self::new()
    }
}

/// An edge joining two or more nodes, in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connector {
    /// Unique connector ID
    pub id: ConnectorId,
    /// Member nodes; no node appears twice
    nodes: IndexSet<NodeId>,
    /// Current selection flag
    pub selected: bool,
    /// Whether selection modes may select this connector
    pub selectable: bool,
}

impl Connector {
    /// Create a connector through the given nodes. Duplicates are dropped.
    pub fn new(nodes: &[NodeId]) -> Self {
        Self {
            id: ConnectorId::new(),
            nodes: nodes.iter().copied().collect(),
            selected: false,
            selectable: true,
        }
    }

    /// Override the selectable flag
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Member nodes in order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// Number of distinct member nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if this connector involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains(&node_id)
    }

    /// Append a node. Returns false if it was already a member.
    pub fn add_node(&mut self, node_id: NodeId) -> bool {
        self.nodes.insert(node_id)
    }

    /// Remove a node, keeping the order of the rest. Returns false if absent.
    pub fn remove_node(&mut self, node_id: NodeId) -> bool {
        self.nodes.shift_remove(&node_id)
    }

    /// Swap `old` for `new` in place. If `new` is already a member, `old` is
    /// simply removed.
    pub fn replace_node(&mut self, old: NodeId, new: NodeId) -> bool {
        if !self.nodes.contains(&old) {
            return false;
        }
        self.nodes = self
            .nodes
            .iter()
            .map(|&n| if n == old { new } else { n })
            .collect();
        true
    }

    /// First and last member, if there are at least two
    pub fn endpoints(&self) -> Option<(NodeId, NodeId)> {
        match (self.nodes.first(), self.nodes.last()) {
            (Some(&first), Some(&last)) if first != last => Some((first, last)),
            _ => None,
        }
    }

    /// Fewer than two members, including none; cannot join anything and
    /// must be dropped by its owner
    pub fn is_dangling(&self) -> bool {
        self.nodes.len() < 2
    }
}
