//! The key-sequence dispatcher seam.
//!
//! Resolving a stream of keystrokes into a bound command is the key
//! dispatcher's job, not the controller's: the controller only decides
//! *which mode* a key is interpreted in and *what is remembered* about the
//! finished action. The [`KeyDispatcher`] trait is that boundary; the
//! bundled tree-walking implementation lives in [`crate::input::keymap`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::editor::mode::Mode;

/// A command reference with its argument payload.
///
/// This is what key bindings store, what the dispatcher hands back once a
/// sequence resolves, and how a replayed word names a stored action.
///
/// # Example
///
/// ```
/// use modalkeys::input::dispatcher::Invocation;
/// use serde_json::json;
///
/// let inv = Invocation::new("modalkeys.enterMode", json!({ "mode": "insert" }));
/// assert_eq!(inv.command, "modalkeys.enterMode");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub command: String,
    #[serde(default)]
    pub args: Value,
}

impl Invocation {
    pub fn new(command: impl Into<String>, args: Value) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// An invocation with no argument payload.
    pub fn bare(command: impl Into<String>) -> Self {
        Self::new(command, Value::Null)
    }
}

/// Resolves individual keystrokes into bound commands, per mode.
///
/// The controller feeds keys one at a time and executes whatever
/// invocation comes back; the dispatcher owns the multi-key sequence
/// state in between.
pub trait KeyDispatcher {
    /// Feeds one key under `mode`. Returns the bound invocation once a
    /// sequence completes; `None` while more keys are pending or when the
    /// key is unbound.
    fn handle_key(&mut self, key: &str, mode: &Mode) -> Option<Invocation>;

    /// True while a multi-key sequence is still incomplete.
    fn waiting_for_key(&self) -> bool;

    /// Abandons any in-progress sequence.
    fn reset(&mut self);

    /// A fresh dispatcher over the same bindings with no in-progress
    /// sequence. Replay and programmatic key runs go through an isolated
    /// instance so they cannot disturb the live sequence state.
    fn isolated(&self) -> Box<dyn KeyDispatcher>;

    /// Help text for the keys pressed so far, if the binding set provides
    /// any.
    fn help(&self) -> Option<String> {
        None
    }
}
