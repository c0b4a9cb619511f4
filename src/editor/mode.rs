//! Input modes for modal editing.
//!
//! The controller interprets every keystroke in the context of the active
//! mode. Three modes are built in — Normal, Insert, and Search — and key
//! binding files may name arbitrary additional modes, which travel as
//! opaque strings. Visual is a pseudo-mode: entering it sets the visual
//! overlay flag while the underlying mode stays Normal, because selection
//! state changes asynchronously and must be tracked independently.
//!
//! # Example
//!
//! ```
//! use modalkeys::editor::mode::Mode;
//!
//! let mode = Mode::default();
//! assert_eq!(mode, Mode::Normal);
//! assert_eq!(format!("{}", mode), "NORMAL");
//!
//! let custom = Mode::from_name("select");
//! assert_eq!(custom, Mode::Custom("select".to_string()));
//! ```

use std::collections::HashMap;
use std::fmt;

/// A named input interpretation context.
///
/// `Visual` only ever appears as a transition target and in per-document
/// mode memory; the active mode is never `Visual` itself. The controller
/// resolves it to Normal plus the visual flag on entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Default mode for navigation and commands.
    Normal,
    /// Raw key capture is suspended; typing edits the document.
    Insert,
    /// Keystrokes feed the incremental search pattern.
    Search,
    /// Pseudo-mode: Normal with the visual overlay flag set.
    Visual,
    /// A user-defined mode from a key binding file.
    Custom(String),
}

impl Mode {
    /// Resolves a mode name from a key binding or command argument.
    pub fn from_name(name: &str) -> Self {
        match name {
            "normal" => Mode::Normal,
            "insert" => Mode::Insert,
            "search" => Mode::Search,
            "visual" => Mode::Visual,
            other => Mode::Custom(other.to_string()),
        }
    }

    /// The lowercase name used in key binding files and mode memory.
    pub fn name(&self) -> &str {
        match self {
            Mode::Normal => "normal",
            Mode::Insert => "insert",
            Mode::Search => "search",
            Mode::Visual => "visual",
            Mode::Custom(name) => name,
        }
    }
}

impl fmt::Display for Mode {
    /// Formats the mode as an uppercase string for the status line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name().to_uppercase())
    }
}

impl Default for Mode {
    /// The editor always starts in Normal mode.
    fn default() -> Self {
        Mode::Normal
    }
}

/// Per-document mode memory.
///
/// When focus returns to a document, its last effective mode (including the
/// Visual pseudo-mode) is restored. Entries are evicted when a document is
/// closed so the map does not grow with editing history.
#[derive(Debug, Default)]
pub struct ModeMemory {
    modes: HashMap<String, Mode>,
}

impl ModeMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `mode` as the effective mode for `document`.
    pub fn record(&mut self, document: &str, mode: Mode) {
        self.modes.insert(document.to_string(), mode);
    }

    /// The last recorded mode for `document`, if any.
    pub fn lookup(&self, document: &str) -> Option<&Mode> {
        self.modes.get(document)
    }

    /// Drops the entry for a closed document.
    pub fn evict(&mut self, document: &str) {
        self.modes.remove(document);
    }
}
