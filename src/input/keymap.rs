//! Tree-walking key dispatcher driven by structured binding data.
//!
//! Bindings are plain data, one tree per mode:
//!
//! ```json
//! {
//!     "normal": {
//!         "/": { "command": "modalkeys.search" },
//!         "d": { "w": { "command": "edit.deleteWord" } }
//!     },
//!     "visual": { "v": "modalkeys.cancelSelection" }
//! }
//! ```
//!
//! A string is shorthand for a command with no arguments; nesting objects
//! build multi-key sequences. Unbound keys silently reset the sequence in
//! progress.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use super::dispatcher::{Invocation, KeyDispatcher};
use crate::editor::controller::names;
use crate::editor::mode::Mode;
use crate::error::{Error, Result};

/// One node in a mode's key tree.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyNode {
    /// More keys required.
    Branch(HashMap<String, KeyNode>),
    /// Sequence complete; run this.
    Leaf(Invocation),
}

/// What a binding value may look like in a preset file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BindingSpec {
    Invoke {
        command: String,
        #[serde(default)]
        args: Value,
    },
    Command(String),
    Branch(HashMap<String, BindingSpec>),
}

impl BindingSpec {
    fn into_node(self) -> KeyNode {
        match self {
            BindingSpec::Command(command) => KeyNode::Leaf(Invocation::bare(command)),
            BindingSpec::Invoke { command, args } => {
                KeyNode::Leaf(Invocation::new(command, args))
            }
            BindingSpec::Branch(map) => KeyNode::Branch(
                map.into_iter()
                    .map(|(key, spec)| (key, spec.into_node()))
                    .collect(),
            ),
        }
    }
}

/// Per-mode key trees, parsed from structured binding data.
#[derive(Debug, Default, PartialEq)]
pub struct Keymap {
    modes: HashMap<String, HashMap<String, KeyNode>>,
}

impl Keymap {
    /// Parses a keybinding object (`{"normal": {...}, ...}`).
    pub fn from_json(value: &Value) -> Result<Self> {
        let specs: HashMap<String, HashMap<String, BindingSpec>> =
            serde_json::from_value(value.clone())
                .map_err(|e| Error::PresetImport(format!("malformed keybindings: {e}")))?;
        let modes = specs
            .into_iter()
            .map(|(mode, tree)| {
                let tree = tree
                    .into_iter()
                    .map(|(key, spec)| (key, spec.into_node()))
                    .collect();
                (mode, tree)
            })
            .collect();
        Ok(Self { modes })
    }

    /// Walks `path` through the tree for `mode`.
    pub fn lookup(&self, mode: &Mode, path: &[String]) -> Option<&KeyNode> {
        let tree = self.modes.get(mode.name())?;
        let (first, rest) = path.split_first()?;
        let mut node = tree.get(first)?;
        for key in rest {
            match node {
                KeyNode::Branch(children) => node = children.get(key)?,
                KeyNode::Leaf(_) => return None,
            }
        }
        Some(node)
    }
}

/// A [`KeyDispatcher`] walking a shared [`Keymap`].
#[derive(Debug, Clone)]
pub struct KeymapDispatcher {
    keymap: Arc<Keymap>,
    pending: Vec<String>,
    pending_mode: Option<Mode>,
}

impl KeymapDispatcher {
    pub fn new(keymap: Keymap) -> Self {
        Self {
            keymap: Arc::new(keymap),
            pending: Vec::new(),
            pending_mode: None,
        }
    }
}

impl KeyDispatcher for KeymapDispatcher {
    fn handle_key(&mut self, key: &str, mode: &Mode) -> Option<Invocation> {
        // A sequence in progress stays in the mode it started in.
        let mode = match &self.pending_mode {
            Some(pending) => pending.clone(),
            None => mode.clone(),
        };
        let mut path = self.pending.clone();
        path.push(key.to_string());

        match self.keymap.lookup(&mode, &path) {
            Some(KeyNode::Branch(_)) => {
                self.pending = path;
                self.pending_mode = Some(mode);
                None
            }
            Some(KeyNode::Leaf(invocation)) => {
                let invocation = invocation.clone();
                trace!(key, mode = mode.name(), command = %invocation.command, "key resolved");
                self.reset();
                Some(invocation)
            }
            None => {
                trace!(key, mode = mode.name(), "key unbound");
                self.reset();
                None
            }
        }
    }

    fn waiting_for_key(&self) -> bool {
        !self.pending.is_empty()
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.pending_mode = None;
    }

    fn isolated(&self) -> Box<dyn KeyDispatcher> {
        Box::new(Self {
            keymap: Arc::clone(&self.keymap),
            pending: Vec::new(),
            pending_mode: None,
        })
    }
}

/// The bundled vim-flavoured bindings the demo binary falls back to when
/// the user has no keybindings file.
pub fn default_keymap() -> Keymap {
    let spec = serde_json::json!({
        "normal": {
            "i": { "command": names::ENTER_INSERT },
            "v": { "command": names::TOGGLE_SELECTION },
            "/": { "command": names::SEARCH, "args": { "wrapAround": true } },
            "?": { "command": names::SEARCH,
                   "args": { "backwards": true, "wrapAround": true } },
            "n": { "command": names::NEXT_MATCH },
            "N": { "command": names::PREVIOUS_MATCH },
            ".": { "command": names::REPEAT_LAST_CHANGE },
            "'": { "command": names::REPEAT_LAST_USED_SELECTION },
            "m": { "command": names::DEFINE_BOOKMARK },
            "`": { "command": names::GOTO_BOOKMARK },
            "\u{1b}": { "command": names::CANCEL_MULTIPLE_SELECTIONS },
        },
        "visual": {
            "v": { "command": names::CANCEL_SELECTION },
            "n": { "command": names::NEXT_MATCH },
            "N": { "command": names::PREVIOUS_MATCH },
            "\u{1b}": { "command": names::CANCEL_SELECTION },
        },
    });
    Keymap::from_json(&spec).expect("bundled keymap is well-formed")
}
