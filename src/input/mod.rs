//! Key dispatch: keymaps, pending-sequence state, and terminal key decoding.

pub mod dispatcher;
pub mod keymap;
pub mod keys;

pub use dispatcher::{Invocation, KeyDispatcher};
pub use keymap::{default_keymap, Keymap, KeymapDispatcher};
pub use keys::{decode, KeyPress};
