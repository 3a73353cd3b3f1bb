//! Export service
//!
//! Re-parses formatted log lines into structured entries and serializes
//! them to CSV or JSON. Lines that do not match the pipeline's line format
//! are skipped rather than failing the export. Emoji level prefixes and
//! ANSI escape sequences are normalized away before level matching, since
//! console-styled lines can end up in files.

use crate::core::level::Level;
use crate::core::record::TIMESTAMP_FORMAT;
use chrono::{Local, NaiveDateTime};
use serde_json::json;
use std::io;
use std::path::Path;

/// One log line parsed back into its fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    pub timestamp: String,
    pub category: String,
    pub level: Level,
    pub message: String,
    pub source: String,
    pub line: u32,
}

/// Remove ANSI color escape sequences (`ESC [ ... m`)
fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for escaped in chars.by_ref() {
                if escaped == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Match a styled level label: plain, emoji-prefixed, or ANSI-colored
fn normalize_level(raw: &str) -> Option<Level> {
    let cleaned = strip_ansi(raw);
    cleaned.split_whitespace().last()?.parse().ok()
}

/// Parse one formatted log line
///
/// Expected shape:
/// `[<timestamp>] [<category>] [<styled-level>] <message> (<source>:<line>)`
#[must_use]
pub fn parse_line(line: &str) -> Option<ExportEntry> {
    let rest = line.strip_prefix('[')?;
    let (timestamp, rest) = rest.split_once("] [")?;
    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).ok()?;

    let (category, rest) = rest.split_once("] [")?;
    let (level_raw, rest) = rest.split_once("] ")?;
    let level = normalize_level(level_raw)?;

    let open = rest.rfind(" (")?;
    let (message, location) = rest.split_at(open);
    let location = location.strip_prefix(" (")?.strip_suffix(')')?;
    let (source, line_no) = location.rsplit_once(':')?;
    let line_no: u32 = line_no.parse().ok()?;

    Some(ExportEntry {
        timestamp: timestamp.to_string(),
        category: category.to_string(),
        level,
        message: message.to_string(),
        source: source.to_string(),
        line: line_no,
    })
}

/// Parse every well-formed line of a log file
///
/// # Errors
///
/// Returns an error only if the file cannot be read; unparsable lines are
/// dropped.
pub fn parse_file(path: &Path) -> io::Result<Vec<ExportEntry>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().filter_map(parse_line).collect())
}

/// Serialize entries to CSV
///
/// The message field is always quoted with internal quotes doubled; the
/// remaining fields never contain commas by construction.
#[must_use]
pub fn to_csv(entries: &[ExportEntry]) -> String {
    let mut out = String::from("Timestamp,Category,Level,Message,Source,Line\n");
    for entry in entries {
        out.push_str(&format!(
            "{},{},{},\"{}\",{},{}\n",
            entry.timestamp,
            entry.category,
            entry.level,
            entry.message.replace('"', "\"\""),
            entry.source,
            entry.line
        ));
    }
    out
}

/// Serialize entries to pretty-printed JSON with sorted keys
///
/// Document shape:
/// `{entries: [{category, level, line, message, source, timestamp}],
/// entryCount, exportDate}`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(entries: &[ExportEntry]) -> serde_json::Result<String> {
    let items: Vec<serde_json::Value> = entries
        .iter()
        .map(|entry| {
            json!({
                "timestamp": entry.timestamp,
                "category": entry.category,
                "level": entry.level.to_str(),
                "message": entry.message,
                "source": entry.source,
                "line": entry.line,
            })
        })
        .collect();

    let document = json!({
        "exportDate": Local::now().format(TIMESTAMP_FORMAT).to_string(),
        "entryCount": entries.len(),
        "entries": items,
    });

    serde_json::to_string_pretty(&document)
}
