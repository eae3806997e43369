// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph canvas for nodeweave.
//!
//! This crate provides the data the input engine operates on:
//! - Nodes with pan-aware rectangle strategies (standard, relative, no-pan)
//! - Multi-endpoint connectors
//! - Hit-testing and rectangle queries
//! - The canvas host: pan/zoom transform, shared flags, the current tick's
//!   event and the notification outbox

pub mod node;
pub mod connector;
pub mod graph;
pub mod event;
pub mod canvas;

pub use node::{ContextMenu, ContextMenuItem, Node, NodeId, NodeKind};
pub use connector::{Connector, ConnectorId};
pub use graph::{Graph, RectTest};
pub use event::{EventKind, InputEvent, ModifierKey};
pub use canvas::{CanvasState, GraphCanvas, Notification};
