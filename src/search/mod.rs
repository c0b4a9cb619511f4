//! Incremental search over an editor surface.

pub mod engine;
pub mod offset;

pub use engine::{SearchArgs, SearchState};
pub use offset::MatchOffset;
