//! Decoration styling for search and bookmark highlights.
//!
//! The controller paints three decoration channels (current matches, other
//! visible matches, bookmarks); this module decides their colors. Each
//! color can be overridden in the config as a `#rrggbb` string and falls
//! back to a built-in default otherwise.
//!
//! # Example
//!
//! ```
//! use modalkeys::config::Config;
//! use modalkeys::theme::DecorationStyles;
//! use ratatui::style::Color;
//!
//! let styles = DecorationStyles::from_config(&Config::default());
//! assert_eq!(styles.primary_match.bg, Color::Yellow);
//! ```

use ratatui::style::Color;

use crate::config::Config;

/// Background and border pair for one decoration channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightStyle {
    pub bg: Color,
    pub border: Color,
}

/// Resolved colors for all decoration channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecorationStyles {
    /// The match each cursor landed on.
    pub primary_match: HighlightStyle,
    /// Other visible occurrences of the pattern.
    pub other_matches: HighlightStyle,
    /// Bookmarked lines.
    pub bookmark: HighlightStyle,
}

impl DecorationStyles {
    /// Resolves styles from the config, falling back to the built-in
    /// defaults for missing or unparsable colors.
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            primary_match: HighlightStyle {
                bg: resolve(&config.search_match_background, defaults.primary_match.bg),
                border: resolve(&config.search_match_border, defaults.primary_match.border),
            },
            other_matches: HighlightStyle {
                bg: resolve(
                    &config.search_other_matches_background,
                    defaults.other_matches.bg,
                ),
                border: resolve(
                    &config.search_other_matches_border,
                    defaults.other_matches.border,
                ),
            },
            bookmark: HighlightStyle {
                bg: resolve(&config.bookmark_color, defaults.bookmark.bg),
                border: resolve(&config.bookmark_color, defaults.bookmark.border),
            },
        }
    }
}

impl Default for DecorationStyles {
    fn default() -> Self {
        Self {
            primary_match: HighlightStyle {
                bg: Color::Yellow,
                border: Color::LightYellow,
            },
            other_matches: HighlightStyle {
                bg: Color::DarkGray,
                border: Color::Gray,
            },
            bookmark: HighlightStyle {
                bg: Color::Blue,
                border: Color::LightBlue,
            },
        }
    }
}

fn resolve(configured: &Option<String>, fallback: Color) -> Color {
    configured
        .as_deref()
        .and_then(parse_hex)
        .unwrap_or(fallback)
}

/// Parses a `#rrggbb` color string.
fn parse_hex(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}
