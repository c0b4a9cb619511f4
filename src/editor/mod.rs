//! Editor state: modes, the controller, repeat recording, and bookmarks.

pub mod controller;
pub mod marks;
pub mod mode;
pub mod repeat;
pub mod session;

pub use controller::{CommandHost, Controller};
pub use mode::Mode;
pub use session::{Message, MessageLevel, Session};
