//! Main logger implementation
//!
//! A `Logger` owns an immutable `SinkConfig` and a private, strictly
//! ordered task queue: every logging call returns immediately, and the
//! formatting, console output, file append, and adapter dispatch all run on
//! the logger's worker thread in submission order. Lines from one logger
//! therefore never interleave with themselves, and no internal failure ever
//! reaches the logging caller.

use super::config::SinkConfig;
use super::destination::Destination;
use super::level::Level;
use super::record::LogRecord;
use super::style::LevelStyle;
use crate::adapters::AdapterRegistry;
use crate::writer::{FileWriter, SizeCache};
use crossbeam_channel::{unbounded, Sender};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default shutdown timeout for logger cleanup (5 seconds)
///
/// Used when the logger is dropped without explicit shutdown. For custom
/// timeout control, use the `shutdown()` method instead.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

enum Task {
    Write(LogRecord),
    Flush(Sender<()>),
}

pub struct Logger {
    config: Arc<SinkConfig>,
    sender: Option<Sender<Task>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl Logger {
    /// Create a logger with default configuration (console only)
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use diaglog::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .min_level(Level::Debug)
    ///     .category("Network")
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    #[must_use]
    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    /// Submit a record to the pipeline
    ///
    /// Returns immediately; records below the configured minimum level are
    /// dropped before entering the queue. The source location is supplied
    /// by the call site (the `log!` family of macros captures it).
    pub fn log(&self, level: Level, message: impl Into<String>, file: &str, line: u32) {
        if level < self.config.min_level {
            return;
        }

        let record = LogRecord::new(
            &self.config.subsystem,
            &self.config.category,
            level,
            message,
            file,
            line,
        );

        if let Some(ref sender) = self.sender {
            // Unbounded queue: the send cannot block, and a send after
            // shutdown is silently ignored.
            let _ = sender.send(Task::Write(record));
        }
    }

    /// Block until every record submitted before this call has been
    /// processed by the worker
    ///
    /// The flush marker rides the same ordered queue as the writes, so when
    /// it comes back all earlier appends have completed.
    pub fn flush(&self) {
        if let Some(ref sender) = self.sender {
            let (ack, done) = crossbeam_channel::bounded(1);
            if sender.send(Task::Flush(ack)).is_ok() {
                let _ = done.recv_timeout(DEFAULT_SHUTDOWN_TIMEOUT);
            }
        }
    }

    /// Gracefully shut down the logger with a custom timeout
    ///
    /// Closes the queue and waits for the worker to drain all pending
    /// records. Returns `true` if the worker finished within the timeout.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        drop(self.sender.take());

        if let Some(handle) = self.worker.take() {
            let start = std::time::Instant::now();

            loop {
                if handle.is_finished() {
                    if let Err(e) = handle.join() {
                        eprintln!(
                            "[LOGGER ERROR] Worker thread panicked during shutdown: {:?}",
                            e
                        );
                        return false;
                    }
                    break;
                }

                if start.elapsed() >= timeout {
                    eprintln!(
                        "[LOGGER WARNING] Worker thread did not finish within timeout. \
                         Some logs may be lost."
                    );
                    return false;
                }

                thread::sleep(Duration::from_millis(10));
            }
        }

        true
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

/// The worker half of a logger: formats records and fans them out
struct Pipeline {
    style: LevelStyle,
    console: bool,
    adapters: Option<AdapterRegistry>,
    file_writer: Option<FileWriter>,
}

impl Pipeline {
    fn new(config: &SinkConfig, size_cache: SizeCache, adapters: Option<AdapterRegistry>) -> Self {
        let console = config.destinations.contains(Destination::Console);
        let adapters = if config.destinations.contains(Destination::Adapters) {
            adapters
        } else {
            None
        };

        // Setup failure disables the file destination once; the remaining
        // destinations keep working.
        let file_writer = if config.destinations.contains(Destination::File) {
            config.file_path.as_ref().and_then(|path| {
                match FileWriter::new(path, config.max_file_size, config.max_backups, size_cache) {
                    Ok(writer) => Some(writer),
                    Err(e) => {
                        eprintln!("[LOGGER ERROR] File destination disabled: {}", e);
                        None
                    }
                }
            })
        } else {
            None
        };

        Self {
            style: config.style.clone(),
            console,
            adapters,
            file_writer,
        }
    }

    fn process(&self, record: &LogRecord) {
        let line = record.format_line(&self.style);

        if self.console {
            // Error and Critical go to stderr, the rest to stdout
            match record.level {
                Level::Error | Level::Critical => eprint!("{}", line),
                _ => print!("{}", line),
            }
        }

        if let Some(ref writer) = self.file_writer {
            if let Err(e) = writer.write_line(&line) {
                // Per-write I/O failures stay inside the pipeline
                eprintln!("[LOGGER ERROR] {}", e);
            }
        }

        if let Some(ref registry) = self.adapters {
            registry.dispatch(record);
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```no_run
/// use diaglog::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(Level::Debug)
///     .subsystem("com.example.app")
///     .category("Database")
///     .destinations(Destinations::of(&[Destination::Console, Destination::File]))
///     .style(LevelStyle::Emoji)
///     .file_path("/tmp/example-logs/db.log")
///     .max_file_size(1024 * 1024)
///     .max_backups(3)
///     .build();
/// ```
pub struct LoggerBuilder {
    config: SinkConfig,
    size_cache: Option<SizeCache>,
    adapters: Option<AdapterRegistry>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: SinkConfig::default(),
            size_cache: None,
            adapters: None,
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: Level) -> Self {
        self.config.min_level = level;
        self
    }

    /// Set the subsystem identifier carried by every record
    #[must_use = "builder methods return a new value"]
    pub fn subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.config.subsystem = subsystem.into();
        self
    }

    /// Set the category that appears in every formatted line
    #[must_use = "builder methods return a new value"]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.config.category = category.into();
        self
    }

    /// Set the destination set records are routed to
    #[must_use = "builder methods return a new value"]
    pub fn destinations(mut self, destinations: super::destination::Destinations) -> Self {
        self.config.destinations = destinations;
        self
    }

    /// Set the level label style
    #[must_use = "builder methods return a new value"]
    pub fn style(mut self, style: LevelStyle) -> Self {
        self.config.style = style;
        self
    }

    /// Set the target file for the file destination
    #[must_use = "builder methods return a new value"]
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.file_path = Some(path.into());
        self
    }

    /// Set the rotation threshold in bytes
    #[must_use = "builder methods return a new value"]
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    /// Set how many retired backups are kept
    #[must_use = "builder methods return a new value"]
    pub fn max_backups(mut self, count: usize) -> Self {
        self.config.max_backups = count;
        self
    }

    /// Share a size cache with other loggers targeting the same file
    ///
    /// Loggers writing the same path must be given clones of one cache so
    /// they observe a consistent size and never race a rotation.
    #[must_use = "builder methods return a new value"]
    pub fn size_cache(mut self, cache: SizeCache) -> Self {
        self.size_cache = Some(cache);
        self
    }

    /// Attach an adapter registry for the adapters destination
    #[must_use = "builder methods return a new value"]
    pub fn adapters(mut self, registry: AdapterRegistry) -> Self {
        self.adapters = Some(registry);
        self
    }

    /// Build the Logger and start its worker thread
    pub fn build(self) -> Logger {
        let config = Arc::new(self.config);
        let pipeline = Pipeline::new(
            &config,
            self.size_cache.unwrap_or_default(),
            self.adapters,
        );

        let (sender, receiver) = unbounded();
        let worker = thread::spawn(move || {
            while let Ok(task) = receiver.recv() {
                match task {
                    Task::Write(record) => pipeline.process(&record),
                    Task::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        });

        Logger {
            config,
            sender: Some(sender),
            worker: Some(worker),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
