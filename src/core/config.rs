//! Per-logger sink configuration
//!
//! A `SinkConfig` is built once by `LoggerBuilder`, owned by exactly one
//! `Logger`, and never mutated afterwards.

use super::destination::Destinations;
use super::level::Level;
use super::style::LevelStyle;
use std::path::PathBuf;

/// Default rotation threshold (5 MiB). Call sites that need a different
/// threshold supply their own via the builder.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Default number of retired backup files kept per log stream
pub const DEFAULT_MAX_BACKUPS: usize = 5;

#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub min_level: Level,
    pub destinations: Destinations,
    pub style: LevelStyle,
    pub subsystem: String,
    pub category: String,
    pub file_path: Option<PathBuf>,
    pub max_file_size: u64,
    pub max_backups: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            min_level: Level::Info,
            destinations: Destinations::all(),
            style: LevelStyle::Plain,
            subsystem: String::new(),
            category: "App".to_string(),
            file_path: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }
}
