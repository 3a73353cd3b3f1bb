//! Log record structure and line formatting

use super::level::Level;
use super::style::LevelStyle;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Timestamp format used in every formatted log line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub subsystem: String,
    pub category: String,
    pub level: Level,
    pub message: String,
    pub file: String,
    pub line: u32,
}

impl LogRecord {
    /// Sanitize log message to keep the one-record-per-line file format intact
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so a message can never masquerade as additional log records.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(
        subsystem: impl Into<String>,
        category: impl Into<String>,
        level: Level,
        message: impl Into<String>,
        file: &str,
        line: u32,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            subsystem: subsystem.into(),
            category: category.into(),
            level,
            message: Self::sanitize_message(&message.into()),
            file: file.to_string(),
            line,
        }
    }

    /// Source file name without its directory components
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file.as_str())
    }

    /// Render the record as a complete log line (newline-terminated)
    ///
    /// Format: `[<timestamp>] [<category>] [<styled-level>] <message> (<file>:<line>)`
    #[must_use]
    pub fn format_line(&self, style: &LevelStyle) -> String {
        format!(
            "[{}] [{}] [{}] {} ({}:{})\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.category,
            style.styled_label(self.level),
            self.message,
            self.file_name(),
            self.line
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(level: Level, message: &str) -> LogRecord {
        LogRecord::new("com.example.app", "Network", level, message, "src/client.rs", 42)
    }

    #[test]
    fn test_message_sanitization() {
        let r = record(Level::Info, "line one\nline two\r\ttabbed");
        assert_eq!(r.message, "line one\\nline two\\r\\ttabbed");
    }

    #[test]
    fn test_format_line_shape() {
        let r = record(Level::Warning, "slow response");
        let line = r.format_line(&LevelStyle::Plain);

        assert!(line.starts_with('['));
        assert!(line.contains("] [Network] [WARNING] slow response (client.rs:42)"));
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn test_file_name_strips_directories() {
        let r = record(Level::Debug, "x");
        assert_eq!(r.file_name(), "client.rs");

        let windows = LogRecord::new("s", "c", Level::Debug, "x", r"C:\src\main.rs", 1);
        assert_eq!(windows.file_name(), "main.rs");
    }

    #[test]
    fn test_timestamp_format_has_millis() {
        let r = record(Level::Info, "x");
        let ts = r.timestamp.format(TIMESTAMP_FORMAT).to_string();
        // yyyy-MM-dd HH:mm:ss.SSS
        assert_eq!(ts.len(), 23);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[19..20], ".");
    }
}
