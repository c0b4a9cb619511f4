//! Keybinding preset files.
//!
//! A preset is a JSON object with a `keybindings` property holding the
//! per-mode key trees (see [`crate::input::keymap`]). Presets are parsed
//! as structured data only; they are never evaluated as code. Any failure
//! (unreadable file, bad JSON, missing `keybindings`) aborts the import
//! without applying a partial configuration.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::error::{Error, Result};
use crate::input::keymap::Keymap;

/// Parses a preset file into a keymap.
pub fn load_keybindings(path: &Path) -> Result<Keymap> {
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::PresetImport(format!("{}: {e}", path.display())))?;
    let preset: Value = serde_json::from_str(&raw)
        .map_err(|e| Error::PresetImport(format!("{}: not valid JSON: {e}", path.display())))?;
    let bindings = preset.get("keybindings").ok_or_else(|| {
        Error::PresetImport(format!("no \"keybindings\" in {}", path.display()))
    })?;
    let keymap = Keymap::from_json(bindings)?;
    info!(path = %path.display(), "keybindings loaded");
    Ok(keymap)
}
