// SPDX-License-Identifier: MIT OR Apache-2.0
//! Composable input modes for nodeweave canvases.
//!
//! Every interaction concern is a separate [`InputMode`]:
//! - Selection: click, multi-select, background clear, select-all, box select
//! - Dragging the selection
//! - Building connectors, by two clicks or from the current selection
//! - Keyboard commands: delete, focus, cancel-all
//!
//! ## Architecture
//!
//! The [`InputEngine`] offers each tick's event to the modes in ascending
//! priority. Modes coordinate only through the shared [`GraphCanvas`] flags
//! and by consuming the event, never by calling each other.
//!
//! [`GraphCanvas`]: nodeweave_graph::GraphCanvas

pub mod mode;
pub mod bindings;
pub mod selection;
pub mod box_select;
pub mod drag;
pub mod connector;
pub mod connector_maker;
pub mod connect_node;
pub mod auxiliary;
pub mod engine;
pub mod egui_bridge;

pub use mode::{priority, InputMode, ModeCore};
pub use bindings::{BindingsError, InputBindings, KeyChord};
pub use selection::{
    BackgroundClickedUnselector, ConnectorSelectMode, NodeSelectMode, SelectAllNodesMode,
};
pub use box_select::BoxSelectMode;
pub use drag::SelectedNodeDragMode;
pub use connector::ConnectorPolicies;
pub use connector_maker::ConnectorMakerMode;
pub use connect_node::{ConnectNodeInputMode, ConnectionStyle};
pub use auxiliary::{CancelAll, DeleteKeyInput, FocusInput};
pub use engine::{InputEngine, RenderLayers};
pub use egui_bridge::EguiEventTranslator;
