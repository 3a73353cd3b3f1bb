//! # Diaglog
//!
//! A client-side diagnostic logging pipeline: structured log records from
//! many call sites are filtered, formatted, and fanned out to console,
//! size-rotated files, and pluggable external sinks. Accumulated log files
//! can be bundled into a zip archive and uploaded to a remote endpoint with
//! progress reporting and cancellation.
//!
//! ## Features
//!
//! - **Fail-safe**: logging calls never block or crash the host application
//! - **Ordered**: each logger's writes land in submission order
//! - **Size-bounded**: rotation with a fixed backup chain per log stream
//! - **Shippable**: archive and upload logs on demand, with progress

pub mod adapters;
pub mod archive;
pub mod core;
pub mod export;
pub mod macros;
pub mod query;
pub mod writer;

pub mod prelude {
    pub use crate::adapters::{AdapterRegistry, LogAdapter};
    pub use crate::archive::{
        ArchiveOptions, Archiver, DeviceInfo, UploadError, UploadJob, UploadOutcome, Uploader,
    };
    pub use crate::core::{
        Destination, Destinations, Level, LevelStyle, LogRecord, Logger, LoggerBuilder,
        LoggerError, Result, SinkConfig, DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::query::{FileRef, LogDirectory};
    pub use crate::writer::SizeCache;
}

pub use adapters::{AdapterRegistry, LogAdapter};
pub use archive::{
    ArchiveOptions, Archiver, DeviceInfo, UploadError, UploadJob, UploadOutcome, Uploader,
};
pub use core::{
    Destination, Destinations, Level, LevelStyle, LogRecord, Logger, LoggerBuilder, LoggerError,
    Result, SinkConfig, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use query::{FileRef, LogDirectory};
pub use writer::SizeCache;
