//! Level label styling
//!
//! Turns a severity level into the styled label that appears in the final
//! log line. Styling is a pure function of (level, style) with no error
//! cases; custom styles are caller-supplied closures.

use super::level::Level;
use colored::Colorize;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied level styling function
pub type StyleFn = Arc<dyn Fn(Level) -> String + Send + Sync>;

/// How severity labels are rendered in formatted lines
///
/// # Examples
///
/// ```
/// use diaglog::core::{Level, LevelStyle};
///
/// assert_eq!(LevelStyle::Plain.styled_label(Level::Warning), "WARNING");
/// assert_eq!(LevelStyle::Emoji.styled_label(Level::Error), "❌ ERROR");
/// ```
///
/// `AnsiColor` output contains terminal escape codes. Lines styled that way
/// are meant for console destinations; feeding them to the export parser
/// requires the parser's escape stripping (see `export`).
#[derive(Clone, Default)]
pub enum LevelStyle {
    /// Bare uppercase label: `DEBUG` .. `CRITICAL`
    #[default]
    Plain,

    /// Emoji-prefixed label: `⚠️ WARNING`
    Emoji,

    /// ANSI-color-coded label for terminals
    AnsiColor,

    /// Custom mapping from level to label
    Custom(StyleFn),
}

impl LevelStyle {
    /// Render the styled label for a level
    #[must_use]
    pub fn styled_label(&self, level: Level) -> String {
        match self {
            LevelStyle::Plain => level.to_str().to_string(),
            LevelStyle::Emoji => level.emoji_label().to_string(),
            LevelStyle::AnsiColor => level.to_str().color(level.color_code()).to_string(),
            LevelStyle::Custom(f) => f(level),
        }
    }
}

impl fmt::Debug for LevelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelStyle::Plain => write!(f, "Plain"),
            LevelStyle::Emoji => write!(f, "Emoji"),
            LevelStyle::AnsiColor => write!(f, "AnsiColor"),
            LevelStyle::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
