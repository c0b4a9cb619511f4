//! Modal key handling for text editors.
//!
//! `modalkeys` is a modal-input controller in the vim tradition: keys are
//! routed through per-mode keymaps instead of inserting text, with a
//! visual mode layered over normal mode, an incremental multi-cursor
//! search, and a recorder that lets the last change or selection be
//! repeated with a single key.
//!
//! The library is editor-agnostic. Everything the controller needs from a
//! document (text, selections, decorations) goes through the
//! [`surface::EditorSurface`] trait; the bundled [`surface::MemorySurface`]
//! backs the demo binary and the tests.
//!
//! # Example
//!
//! ```
//! use modalkeys::editor::controller::Controller;
//! use modalkeys::editor::mode::Mode;
//! use modalkeys::input::keymap::{default_keymap, KeymapDispatcher};
//! use modalkeys::surface::MemorySurface;
//!
//! let surface = MemorySurface::new("notes.txt", "hello world");
//! let mut controller =
//!     Controller::new(surface, Box::new(KeymapDispatcher::new(default_keymap())));
//! controller.on_key("i").unwrap();
//! assert_eq!(controller.mode(), &Mode::Insert);
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod input;
pub mod search;
pub mod surface;
pub mod theme;
pub mod ui;

pub use editor::controller::Controller;
pub use editor::mode::Mode;
pub use error::{Error, Result};
pub use input::keymap::{default_keymap, Keymap, KeymapDispatcher};
pub use surface::{EditorSurface, MemorySurface, Selection, TextRange};
