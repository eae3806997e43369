// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connectors.

use crate::connector::{Connector, ConnectorId};
use crate::node::{Node, NodeId, NodeKind};
use egui::{Pos2, Rect, Vec2};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Limit on how many relative nodes may be chained before resolution stops.
const MAX_ANCHOR_DEPTH: usize = 16;

/// How a query rectangle is matched against element bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RectTest {
    /// Element bounds intersect the rectangle
    #[default]
    Overlap,
    /// Element bounds lie entirely inside the rectangle
    Contained,
}

/// A node graph. Node order is draw order; the last node is topmost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connectors between nodes
    connectors: IndexMap<ConnectorId, Connector>,
    /// Source of selection stamps
    #[serde(default)]
    selection_clock: u64,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connectors: IndexMap::new(),
            selection_clock: 0,
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node. Connectors lose the node; any connector left with
    /// fewer than two members is removed as well.
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let node = self.nodes.shift_remove(&node_id)?;
        for connector in self.connectors.values_mut() {
            connector.remove_node(node_id);
        }
        self.connectors.retain(|_, c| !c.is_dangling());
        Some(node)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Check whether a node exists
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Add a connector
    pub fn add_connector(&mut self, connector: Connector) -> ConnectorId {
        let id = connector.id;
        self.connectors.insert(id, connector);
        id
    }

    /// Remove a connector
    pub fn remove_connector(&mut self, connector_id: ConnectorId) -> Option<Connector> {
        self.connectors.shift_remove(&connector_id)
    }

    /// Get a connector by ID
    pub fn connector(&self, connector_id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(&connector_id)
    }

    /// Get a mutable connector by ID
    pub fn connector_mut(&mut self, connector_id: ConnectorId) -> Option<&mut Connector> {
        self.connectors.get_mut(&connector_id)
    }

    /// Get all connectors
    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.values()
    }

    /// Get all connector IDs
    pub fn connector_ids(&self) -> impl Iterator<Item = ConnectorId> + '_ {
        self.connectors.keys().copied()
    }

    /// Get connectors involving a node
    pub fn connectors_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connector> {
        self.connectors.values().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connectors
    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Rendered rect of a node for the given pan offset
    pub fn rendered_rect(&self, node_id: NodeId, pan: Vec2) -> Option<Rect> {
        self.resolve_rect(node_id, pan, 0)
    }

    fn resolve_rect(&self, node_id: NodeId, pan: Vec2, depth: usize) -> Option<Rect> {
        let node = self.nodes.get(&node_id)?;
        let anchor_rect = match node.kind {
            NodeKind::Relative { anchor, .. } if depth < MAX_ANCHOR_DEPTH => {
                self.resolve_rect(anchor, pan, depth + 1)
            }
            _ => None,
        };
        Some(node.rendered_rect(pan, anchor_rect))
    }

    /// Rendered centres of a connector's members, in order
    pub fn connector_points(&self, connector_id: ConnectorId, pan: Vec2) -> Vec<Pos2> {
        self.connectors
            .get(&connector_id)
            .map(|c| {
                c.nodes()
                    .filter_map(|n| self.rendered_rect(n, pan))
                    .map(|r| r.center())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Topmost selectable node whose rendered rect contains `point`
    pub fn node_at(&self, point: Pos2, pan: Vec2) -> Option<NodeId> {
        self.nodes
            .values()
            .rev()
            .filter(|n| n.selectable)
            .find(|n| {
                self.rendered_rect(n.id, pan)
                    .is_some_and(|r| r.contains(point))
            })
            .map(|n| n.id)
    }

    /// Topmost selectable connector passing within `tolerance` of `point`
    pub fn connector_at(&self, point: Pos2, pan: Vec2, tolerance: f32) -> Option<ConnectorId> {
        self.connectors
            .values()
            .rev()
            .filter(|c| c.selectable)
            .find(|c| {
                self.connector_points(c.id, pan)
                    .windows(2)
                    .any(|seg| distance_to_segment(point, seg[0], seg[1]) <= tolerance)
            })
            .map(|c| c.id)
    }

    /// Selectable nodes matching `rect` under `test`
    pub fn nodes_in_rect(&self, rect: Rect, pan: Vec2, test: RectTest) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.selectable)
            .filter(|n| {
                self.rendered_rect(n.id, pan).is_some_and(|r| match test {
                    RectTest::Overlap => rect.intersects(r),
                    RectTest::Contained => rect.contains_rect(r),
                })
            })
            .map(|n| n.id)
            .collect()
    }

    /// Selectable connectors matching `rect` under `test`
    pub fn connectors_in_rect(&self, rect: Rect, pan: Vec2, test: RectTest) -> Vec<ConnectorId> {
        self.connectors
            .values()
            .filter(|c| c.selectable)
            .filter(|c| {
                let points = self.connector_points(c.id, pan);
                match test {
                    RectTest::Overlap => points
                        .windows(2)
                        .any(|seg| segment_intersects_rect(seg[0], seg[1], rect)),
                    RectTest::Contained => {
                        points.len() >= 2 && points.iter().all(|p| rect.contains(*p))
                    }
                }
            })
            .map(|c| c.id)
            .collect()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select a node. Returns whether anything changed.
    pub fn select_node(&mut self, node_id: NodeId) -> bool {
        let stamp = self.selection_clock + 1;
        match self.nodes.get_mut(&node_id) {
            Some(node) if node.selectable && !node.selected => {
                node.selected = true;
                node.selected_at = stamp;
                self.selection_clock = stamp;
                true
            }
            _ => false,
        }
    }

    /// Unselect a node. Returns whether anything changed.
    pub fn unselect_node(&mut self, node_id: NodeId) -> bool {
        match self.nodes.get_mut(&node_id) {
            Some(node) if node.selected => {
                node.selected = false;
                true
            }
            _ => false,
        }
    }

    /// Toggle node selection. Returns whether anything changed.
    pub fn toggle_node(&mut self, node_id: NodeId) -> bool {
        if self.is_node_selected(node_id) {
            self.unselect_node(node_id)
        } else {
            self.select_node(node_id)
        }
    }

    /// Check if a node is selected
    pub fn is_node_selected(&self, node_id: NodeId) -> bool {
        self.nodes.get(&node_id).is_some_and(|n| n.selected)
    }

    /// Select a connector. Returns whether anything changed.
    pub fn select_connector(&mut self, connector_id: ConnectorId) -> bool {
        match self.connectors.get_mut(&connector_id) {
            Some(c) if c.selectable && !c.selected => {
                c.selected = true;
                true
            }
            _ => false,
        }
    }

    /// Unselect a connector. Returns whether anything changed.
    pub fn unselect_connector(&mut self, connector_id: ConnectorId) -> bool {
        match self.connectors.get_mut(&connector_id) {
            Some(c) if c.selected => {
                c.selected = false;
                true
            }
            _ => false,
        }
    }

    /// Toggle connector selection. Returns whether anything changed.
    pub fn toggle_connector(&mut self, connector_id: ConnectorId) -> bool {
        if self.is_connector_selected(connector_id) {
            self.unselect_connector(connector_id)
        } else {
            self.select_connector(connector_id)
        }
    }

    /// Check if a connector is selected
    pub fn is_connector_selected(&self, connector_id: ConnectorId) -> bool {
        self.connectors.get(&connector_id).is_some_and(|c| c.selected)
    }

    /// Select every selectable node. Returns whether anything changed.
    pub fn select_all_nodes(&mut self) -> bool {
        let ids: Vec<NodeId> = self.node_ids().collect();
        ids.into_iter().fold(false, |changed, id| self.select_node(id) || changed)
    }

    /// Unselect every node. Returns whether anything changed.
    pub fn unselect_all_nodes(&mut self) -> bool {
        let mut changed = false;
        for node in self.nodes.values_mut().filter(|n| n.selected) {
            node.selected = false;
            changed = true;
        }
        changed
    }

    /// Unselect every node and connector. Returns whether anything changed.
    pub fn unselect_all(&mut self) -> bool {
        let nodes = self.unselect_all_nodes();
        let mut connectors = false;
        for c in self.connectors.values_mut().filter(|c| c.selected) {
            c.selected = false;
            connectors = true;
        }
        nodes || connectors
    }

    /// Selected nodes, oldest selection first
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        let mut selected: Vec<&Node> = self.nodes.values().filter(|n| n.selected).collect();
        selected.sort_by_key(|n| n.selected_at);
        selected.into_iter().map(|n| n.id).collect()
    }

    /// Number of selected nodes
    pub fn selected_node_count(&self) -> usize {
        self.nodes.values().filter(|n| n.selected).count()
    }

    /// Selected connectors in graph order
    pub fn selected_connectors(&self) -> Vec<ConnectorId> {
        self.connectors
            .values()
            .filter(|c| c.selected)
            .map(|c| c.id)
            .collect()
    }

    /// Whether every selectable node is selected
    pub fn all_nodes_selected(&self) -> bool {
        self.nodes
            .values()
            .filter(|n| n.selectable)
            .all(|n| n.selected)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn segments_intersect(p1: Pos2, p2: Pos2, p3: Pos2, p4: Pos2) -> bool {
    let d1 = cross(p4 - p3, p1 - p3);
    let d2 = cross(p4 - p3, p2 - p3);
    let d3 = cross(p2 - p1, p3 - p1);
    let d4 = cross(p2 - p1, p4 - p1);
    (d1 > 0.0) != (d2 > 0.0) && (d3 > 0.0) != (d4 > 0.0)
}

fn segment_intersects_rect(a: Pos2, b: Pos2, rect: Rect) -> bool {
    if rect.contains(a) || rect.contains(b) {
        return true;
    }
    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    (0..4).any(|i| segments_intersect(a, b, corners[i], corners[(i + 1) % 4]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> Node {
        Node::at(Pos2::new(x, y), Vec2::splat(size))
    }

    #[test]
    fn test_remove_node_drops_dangling_connectors() {
        let mut graph = Graph::default();
        let a = graph.add_node(square(0.0, 0.0, 10.0));
        let b = graph.add_node(square(20.0, 0.0, 10.0));
        let c = graph.add_node(square(40.0, 0.0, 10.0));
        let ab = graph.add_connector(Connector::new(&[a, b]));
        let abc = graph.add_connector(Connector::new(&[a, b, c]));

        graph.remove_node(a);

        assert!(graph.connector(ab).is_none());
        let remaining = graph.connector(abc).map(|c| c.nodes().collect::<Vec<_>>());
        assert_eq!(remaining, Some(vec![b, c]));
    }

    #[test]
    fn test_node_at_returns_topmost_selectable() {
        let mut graph = Graph::default();
        let bottom = graph.add_node(square(0.0, 0.0, 50.0));
        let top = graph.add_node(square(10.0, 10.0, 10.0));
        graph.add_node(Node::anchor(Pos2::new(15.0, 15.0)));

        assert_eq!(graph.node_at(Pos2::new(15.0, 15.0), Vec2::ZERO), Some(top));
        assert_eq!(graph.node_at(Pos2::new(40.0, 40.0), Vec2::ZERO), Some(bottom));
        assert_eq!(graph.node_at(Pos2::new(40.0, 40.0), Vec2::new(100.0, 0.0)), None);
    }

    #[test]
    fn test_connector_hit_test() {
        let mut graph = Graph::default();
        let a = graph.add_node(square(0.0, 0.0, 10.0));
        let b = graph.add_node(square(100.0, 0.0, 10.0));
        let id = graph.add_connector(Connector::new(&[a, b]));

        assert_eq!(graph.connector_at(Pos2::new(50.0, 7.0), Vec2::ZERO, 4.0), Some(id));
        assert_eq!(graph.connector_at(Pos2::new(50.0, 20.0), Vec2::ZERO, 4.0), None);
    }

    #[test]
    fn test_rect_queries_overlap_vs_contained() {
        let mut graph = Graph::default();
        let inside = graph.add_node(square(10.0, 10.0, 10.0));
        let partial = graph.add_node(square(45.0, 45.0, 10.0));
        let outside = graph.add_node(square(80.0, 80.0, 10.0));
        let query = Rect::from_min_max(Pos2::ZERO, Pos2::new(50.0, 50.0));

        let overlap = graph.nodes_in_rect(query, Vec2::ZERO, RectTest::Overlap);
        assert_eq!(overlap, vec![inside, partial]);
        assert!(!overlap.contains(&outside));

        let contained = graph.nodes_in_rect(query, Vec2::ZERO, RectTest::Contained);
        assert_eq!(contained, vec![inside]);
    }

    #[test]
    fn test_connectors_in_rect() {
        let mut graph = Graph::default();
        let a = graph.add_node(square(0.0, 0.0, 10.0));
        let b = graph.add_node(square(100.0, 0.0, 10.0));
        let id = graph.add_connector(Connector::new(&[a, b]));
        let crossing = Rect::from_min_max(Pos2::new(40.0, 0.0), Pos2::new(60.0, 10.0));

        assert_eq!(graph.connectors_in_rect(crossing, Vec2::ZERO, RectTest::Overlap), vec![id]);
        assert!(graph
            .connectors_in_rect(crossing, Vec2::ZERO, RectTest::Contained)
            .is_empty());
    }

    #[test]
    fn test_selection_order() {
        let mut graph = Graph::default();
        let a = graph.add_node(square(0.0, 0.0, 10.0));
        let b = graph.add_node(square(20.0, 0.0, 10.0));
        assert!(graph.select_node(b));
        assert!(graph.select_node(a));
        assert!(!graph.select_node(a));
        assert_eq!(graph.selected_nodes(), vec![b, a]);
    }

    #[test]
    fn test_unselectable_nodes_are_skipped() {
        let mut graph = Graph::default();
        let a = graph.add_node(square(0.0, 0.0, 10.0));
        let anchor = graph.add_node(Node::anchor(Pos2::ZERO));
        assert!(!graph.select_node(anchor));
        assert!(graph.select_node(a));
        assert!(graph.all_nodes_selected());
    }

    #[test]
    fn test_relative_chain_resolution() {
        let mut graph = Graph::default();
        let base = graph.add_node(square(10.0, 10.0, 10.0));
        let first = graph.add_node(Node::relative(base, Vec2::new(5.0, 0.0), Vec2::splat(2.0)));
        let second = graph.add_node(Node::relative(first, Vec2::new(5.0, 0.0), Vec2::splat(2.0)));

        let rect = graph.rendered_rect(second, Vec2::new(1.0, 0.0));
        assert_eq!(rect.map(|r| r.min), Some(Pos2::new(21.0, 10.0)));
    }

    #[test]
    fn test_relative_cycle_terminates() {
        let mut graph = Graph::default();
        let a_id = NodeId::new();
        let mut b = Node::relative(a_id, Vec2::new(1.0, 0.0), Vec2::splat(1.0));
        let mut a = Node::relative(b.id, Vec2::new(1.0, 0.0), Vec2::splat(1.0));
        a.id = a_id;
        b.kind = NodeKind::Relative { anchor: a.id, offset: Vec2::new(1.0, 0.0) };
        graph.add_node(a);
        graph.add_node(b);
        assert!(graph.rendered_rect(a_id, Vec2::ZERO).is_some());
    }
}
