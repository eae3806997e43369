// SPDX-License-Identifier: MIT OR Apache-2.0
//! Key bindings and per-mode options, stored as RON.

use crate::connect_node::ConnectionStyle;
use egui::{Key, Modifiers};
use nodeweave_graph::{InputEvent, ModifierKey, RectTest};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading or saving bindings
#[derive(Debug, Error)]
pub enum BindingsError {
    /// File could not be read or written
    #[error("Bindings IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents are not valid bindings
    #[error("Invalid bindings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Bindings could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Result type for bindings operations
pub type Result<T> = std::result::Result<T, BindingsError>;

/// A key together with the exact modifiers that must be held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChord {
    /// Key
    pub key: Key,
    /// Ctrl (or Cmd) held
    #[serde(default)]
    pub ctrl: bool,
    /// Shift held
    #[serde(default)]
    pub shift: bool,
    /// Alt held
    #[serde(default)]
    pub alt: bool,
}

impl KeyChord {
    /// A bare key
    pub const fn key(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
            alt: false,
        }
    }

    /// Require Ctrl
    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// Require Shift
    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Require Alt
    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Whether a key press with these modifiers triggers the chord
    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        self.key == key
            && self.ctrl == ModifierKey::Ctrl.is_held(modifiers)
            && self.shift == modifiers.shift
            && self.alt == modifiers.alt
    }

    /// Whether an event is a key press triggering the chord
    pub fn matches_event(&self, event: &InputEvent) -> bool {
        matches!(event, InputEvent::Key { key, modifiers } if self.matches(*key, *modifiers))
    }

    /// Modifiers that trigger the chord, for synthesising events
    pub fn modifiers(&self) -> Modifiers {
        Modifiers {
            ctrl: self.ctrl,
            shift: self.shift,
            alt: self.alt,
            ..Modifiers::NONE
        }
    }

    /// Key event that triggers the chord
    pub fn to_event(&self) -> InputEvent {
        InputEvent::Key {
            key: self.key,
            modifiers: self.modifiers(),
        }
    }
}

/// Bindings and options for the built-in modes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputBindings {
    /// Toggle select-all
    pub select_all: KeyChord,
    /// Delete selection
    pub delete: KeyChord,
    /// Focus the view
    pub focus: KeyChord,
    /// Cancel every gesture
    pub cancel: KeyChord,
    /// Toggle the two-click connector gesture
    pub connector_maker: KeyChord,
    /// Optional chord starting connect-from-selection
    pub connect_selected: Option<KeyChord>,
    /// Context menu action starting connect-from-selection
    pub connect_action: String,
    /// Which selected nodes connect-from-selection uses
    pub connection_style: ConnectionStyle,
    /// Modifier that toggles instead of replacing selection
    pub multi_select: ModifierKey,
    /// Modifier that turns a primary drag into a pan
    pub pan_modifier: ModifierKey,
    /// How the selection rectangle matches nodes
    pub box_select_test: RectTest,
    /// Whether the selection rectangle also selects connectors
    pub box_select_connectors: bool,
    /// Grid size dragged nodes snap to on release
    pub drag_snap: Option<f32>,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            select_all: KeyChord::key(Key::A).ctrl(),
            delete: KeyChord::key(Key::Delete),
            focus: KeyChord::key(Key::F),
            cancel: KeyChord::key(Key::Escape),
            connector_maker: KeyChord::key(Key::C).shift(),
            connect_selected: None,
            connect_action: "connect".to_string(),
            connection_style: ConnectionStyle::default(),
            multi_select: ModifierKey::Shift,
            pan_modifier: ModifierKey::Alt,
            box_select_test: RectTest::Overlap,
            box_select_connectors: false,
            drag_snap: None,
        }
    }
}

impl InputBindings {
    /// Parse bindings from RON. Missing fields take their defaults.
    pub fn from_ron(source: &str) -> Result<Self> {
        Ok(ron::from_str(source)?)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load bindings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let bindings = Self::from_ron(&content)?;
        tracing::info!(path = %path.display(), "Loaded input bindings");
        Ok(bindings)
    }

    /// Save bindings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}
