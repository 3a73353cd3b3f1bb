//! Append-only file writer with size-bounded rotation
//!
//! One `FileWriter` serves one logger's file destination. The cached size
//! for the target path lives in a `SizeCache` shared by every writer
//! targeting that path; the per-file lock is held across the whole
//! rotate-then-append sequence so concurrent loggers never race a rotation
//! or corrupt each other's lines.

use super::rotation;
use super::size_cache::SizeCache;
use crate::core::error::{LoggerError, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct FileWriter {
    path: PathBuf,
    max_size: u64,
    max_backups: usize,
    cache: SizeCache,
}

impl FileWriter {
    /// Create a writer for a target path
    ///
    /// The parent directory is created here, once; if that fails the file
    /// destination is unusable and the caller disables it.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryUnavailable` if the parent directory cannot be
    /// created.
    pub fn new(
        path: impl Into<PathBuf>,
        max_size: u64,
        max_backups: usize,
        cache: SizeCache,
    ) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    LoggerError::directory(parent.display().to_string(), e.to_string())
                })?;
            }
        }

        Ok(Self {
            path,
            max_size,
            max_backups,
            cache,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one formatted line, rotating first if the cached size has
    /// reached the threshold
    ///
    /// A rotation failure is reported and skipped: the write still happens,
    /// the cached size keeps growing past the threshold, and rotation is
    /// retried on the next write.
    ///
    /// # Errors
    ///
    /// Returns an error if the append itself fails; the logger worker
    /// catches it.
    pub fn write_line(&self, text: &str) -> Result<()> {
        let entry = self.cache.entry(&self.path);
        let mut size = entry.lock();

        if *size >= self.max_size {
            match rotation::rotate(&self.path, self.max_backups) {
                Ok(()) => *size = 0,
                Err(e) => {
                    // Skip rotation, keep the size so the next write retries.
                    // The file may temporarily exceed the target size.
                    eprintln!("[LOGGER WARNING] {}. Continuing with current file.", e);
                }
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                LoggerError::file_writer(
                    self.path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        let bytes = text.as_bytes();
        file.write_all(bytes).map_err(|e| {
            LoggerError::file_writer(
                self.path.display().to_string(),
                format!("Failed to write log line: {}", e),
            )
        })?;

        *size += bytes.len() as u64;
        Ok(())
    }
}
