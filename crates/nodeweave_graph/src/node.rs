// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph canvas.

use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// How a node's rendered rectangle is derived from its base rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Rendered at its base rect shifted by the canvas pan offset
    Standard,
    /// Positioned at another node's rendered rect plus an offset
    Relative {
        /// Node this one follows
        anchor: NodeId,
        /// Offset from the anchor's top-left corner
        offset: Vec2,
    },
    /// Ignores the pan offset (fixed overlays)
    NoPan,
}

/// A single entry of a node's context menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMenuItem {
    /// Label shown to the user
    pub label: String,
    /// Action name surfaced to input modes when chosen
    pub action: String,
}

/// Context menu descriptor attached to a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMenu {
    /// Items in display order
    pub items: Vec<ContextMenuItem>,
}

impl ContextMenu {
    /// Create an empty menu
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item
    pub fn with_item(mut self, label: impl Into<String>, action: impl Into<String>) -> Self {
        self.items.push(ContextMenuItem {
            label: label.into(),
            action: action.into(),
        });
        self
    }

    /// Find the action bound to a label
    pub fn action_for(&self, label: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.label == label)
            .map(|item| item.action.as_str())
    }
}

/// A node instance on the canvas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Rectangle in canvas space, before pan is applied
    pub rect: Rect,
    /// Rectangle strategy
    pub kind: NodeKind,
    /// Opaque application data
    pub payload: Option<ron::Value>,
    /// Context menu shown for this node
    pub context_menu: Option<ContextMenu>,
    /// Whether selection modes may select this node
    pub selectable: bool,
    /// Current selection flag
    pub selected: bool,
    /// Selection stamp, used to order the selection
    #[serde(default)]
    pub(crate) selected_at: u64,
}

impl Node {
    /// Create a standard, selectable node
    pub fn new(rect: Rect) -> Self {
        Self {
            id: NodeId::new(),
            rect,
            kind: NodeKind::Standard,
            payload: None,
            context_menu: None,
            selectable: true,
            selected: false,
            selected_at: 0,
        }
    }

    /// Create a standard node at a position with a size
    pub fn at(position: Pos2, size: Vec2) -> Self {
        Self::new(Rect::from_min_size(position, size))
    }

    /// Create a node that follows `anchor`. Relative nodes are never selectable.
    pub fn relative(anchor: NodeId, offset: Vec2, size: Vec2) -> Self {
        Self {
            kind: NodeKind::Relative { anchor, offset },
            selectable: false,
            ..Self::new(Rect::from_min_size(Pos2::ZERO, size))
        }
    }

    /// Create a node that is not affected by panning
    pub fn no_pan(rect: Rect) -> Self {
        Self {
            kind: NodeKind::NoPan,
            ..Self::new(rect)
        }
    }

    /// Create a zero-sized, unselectable node used to let connectors follow the pointer
    pub fn anchor(position: Pos2) -> Self {
        Self {
            selectable: false,
            ..Self::new(Rect::from_min_size(position, Vec2::ZERO))
        }
    }

    /// Attach a payload
    pub fn with_payload(mut self, payload: ron::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attach a context menu
    pub fn with_context_menu(mut self, menu: ContextMenu) -> Self {
        self.context_menu = Some(menu);
        self
    }

    /// Override the selectable flag
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable && !self.is_relative();
        self
    }

    /// Whether this node follows another node
    pub fn is_relative(&self) -> bool {
        matches!(self.kind, NodeKind::Relative { .. })
    }

    /// Whether the pan offset moves this node
    pub fn follows_pan(&self) -> bool {
        !matches!(self.kind, NodeKind::NoPan)
    }

    /// Top-left corner of the base rect
    pub fn position(&self) -> Pos2 {
        self.rect.min
    }

    /// Move the base rect so its top-left corner is at `position`
    pub fn set_position(&mut self, position: Pos2) {
        self.rect = Rect::from_min_size(position, self.rect.size());
    }

    /// Rendered rectangle given the pan offset and, for relative nodes, the
    /// anchor's rendered rectangle.
    pub fn rendered_rect(&self, pan: Vec2, anchor_rect: Option<Rect>) -> Rect {
        match self.kind {
            NodeKind::Standard => self.rect.translate(pan),
            NodeKind::NoPan => self.rect,
            NodeKind::Relative { offset, .. } => {
                let origin = anchor_rect.map_or(pan.to_pos2(), |r| r.min);
                Rect::from_min_size(origin + offset, self.rect.size())
            }
        }
    }

    /// Apply a drag delta. Returns whether the node moved.
    pub fn drag(&mut self, delta: Vec2) -> bool {
        if self.is_relative() || delta == Vec2::ZERO {
            return false;
        }
        self.rect = self.rect.translate(delta);
        true
    }

    /// Snap the base position to a grid
    pub fn snap_to_grid(&mut self, grid: f32) {
        if grid <= 0.0 {
            return;
        }
        let p = self.position();
        self.set_position(Pos2::new(
            (p.x / grid).round() * grid,
            (p.y / grid).round() * grid,
        ));
    }
}
