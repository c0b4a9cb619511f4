//! Configuration for the modalkeys controller and demo binary.
//!
//! Configuration is loaded from a TOML file and covers the presentation of
//! search and bookmark highlights plus the location of the keybindings
//! file. Every field is optional; absent colors fall back to the theme
//! defaults in [`crate::theme`].
//!
//! # Example
//!
//! ```
//! use modalkeys::config::Config;
//!
//! let config = Config::default();
//! assert!(config.search_match_background.is_none());
//! assert!(config.keybindings_file.is_none());
//! ```

pub mod presets;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// User-tunable settings.
///
/// Colors are `#rrggbb` strings; a missing or unparsable color falls back
/// to the built-in theme at highlight-update time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Background of the match each cursor landed on.
    pub search_match_background: Option<String>,

    /// Border of the current match.
    pub search_match_border: Option<String>,

    /// Background of other visible matches.
    pub search_other_matches_background: Option<String>,

    /// Border of other visible matches.
    pub search_other_matches_border: Option<String>,

    /// Highlight for bookmarked lines.
    pub bookmark_color: Option<String>,

    /// JSON keybindings file loaded at startup. When absent the bundled
    /// default bindings are used.
    pub keybindings_file: Option<PathBuf>,
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/modalkeys/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("modalkeys");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist or
    /// can't be read.
    pub fn load() -> Self {
        let config_path = match Self::config_path() {
            Some(path) => path,
            None => return Self::default(),
        };

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|_| Self::default()),
            Err(_) => Self::default(),
        }
    }

    /// Saves configuration to the default config file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, toml_string)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_all_unset() {
        let config = Config::default();
        assert!(config.search_match_background.is_none());
        assert!(config.bookmark_color.is_none());
        assert!(config.keybindings_file.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config =
            toml::from_str("search_match_background = \"#ffcc00\"").unwrap();
        assert_eq!(
            config.search_match_background.as_deref(),
            Some("#ffcc00")
        );
        assert!(config.search_other_matches_background.is_none());
    }
}
