//! Error types for the controller core.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by controller operations.
///
/// Programmer errors (bad command arguments, appending keys to a finalized
/// word) are fatal to the triggering call. Search misses and wraparound
/// notices are *not* errors; they travel as status messages instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A word stored as a resolved command never accepts further raw keys.
    #[error("expected a key sequence, got a resolved command")]
    FinalizedWord,

    /// A command was invoked with an argument payload it cannot parse.
    #[error("{command}: invalid arguments: {details}")]
    InvalidArgs { command: String, details: String },

    /// A key binding referenced a command nobody provides.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The configured match-offset policy is not one of
    /// inclusive/exclusive/start/end.
    #[error("unexpected search offset \"{0}\"")]
    BadOffset(String),

    /// Preset import failed; no configuration was applied.
    #[error("could not import presets: {0}")]
    PresetImport(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Builds an invalid-arguments error for `command`.
    pub fn invalid_args(command: &str, details: impl std::fmt::Display) -> Self {
        Error::InvalidArgs {
            command: command.to_string(),
            details: details.to_string(),
        }
    }
}
