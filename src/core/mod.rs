//! Core pipeline types

pub mod config;
pub mod destination;
pub mod error;
pub mod level;
pub mod logger;
pub mod record;
pub mod style;

pub use config::{SinkConfig, DEFAULT_MAX_BACKUPS, DEFAULT_MAX_FILE_SIZE};
pub use destination::{Destination, Destinations};
pub use error::{LoggerError, Result};
pub use level::Level;
pub use logger::{Logger, LoggerBuilder, DEFAULT_SHUTDOWN_TIMEOUT};
pub use record::{LogRecord, TIMESTAMP_FORMAT};
pub use style::{LevelStyle, StyleFn};
