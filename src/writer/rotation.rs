//! Backup rotation for size-bounded log files
//!
//! Backups are numbered `name.log.1` (newest) through `name.log.N`
//! (oldest). Rotation drops the file at suffix N, shifts every remaining
//! suffix up by one, and retires the active file to suffix 1. The caller
//! recreates the active file on its next append.

use crate::core::error::{LoggerError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Backup path for a given suffix index
///
/// `backup_path("app.log", 2)` is `app.log.2`.
#[must_use]
pub fn backup_path(base: &Path, index: usize) -> PathBuf {
    let mut path = base.to_path_buf();
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("app.log");
    path.set_file_name(format!("{}.{}", filename, index));
    path
}

/// Rotate the active file into the backup chain
///
/// After a successful rotation the active file is absent and at most
/// `max_backups` backups exist. With `max_backups == 0` the active file is
/// simply deleted.
///
/// # Errors
///
/// Returns an error if any rename or delete fails; the caller is expected
/// to log it, skip the rotation, and retry on the next write.
pub fn rotate(base: &Path, max_backups: usize) -> Result<()> {
    if max_backups == 0 {
        if base.exists() {
            fs::remove_file(base).map_err(|e| {
                LoggerError::file_rotation(
                    base.display().to_string(),
                    format!("Failed to remove active file: {}", e),
                )
            })?;
        }
        return Ok(());
    }

    // Drop the oldest backup so the shift below cannot exceed the bound
    let oldest = backup_path(base, max_backups);
    if oldest.exists() {
        fs::remove_file(&oldest).map_err(|e| {
            LoggerError::file_rotation(
                base.display().to_string(),
                format!("Failed to remove oldest backup {}: {}", oldest.display(), e),
            )
        })?;
    }

    // Shift suffix i -> i+1, newest last to oldest first
    for i in (1..max_backups).rev() {
        let old_path = backup_path(base, i);
        if old_path.exists() {
            let new_path = backup_path(base, i + 1);
            fs::rename(&old_path, &new_path).map_err(|e| {
                LoggerError::file_rotation(
                    old_path.display().to_string(),
                    format!("Failed to shift backup to {}: {}", new_path.display(), e),
                )
            })?;
        }
    }

    // Retire the active file to suffix 1
    if base.exists() {
        let first = backup_path(base, 1);
        fs::rename(base, &first).map_err(|e| {
            LoggerError::file_rotation(
                base.display().to_string(),
                format!("Failed to retire active file: {}", e),
            )
        })?;
    }

    Ok(())
}
