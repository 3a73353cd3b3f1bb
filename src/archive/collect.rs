//! Log file selection and archive packaging
//!
//! Selected files are copied into an isolated working subdirectory before
//! zipping, so live writers are unaffected and the archive is a consistent
//! snapshot. The workspace is deleted whatever the outcome; cleanup is
//! idempotent and tolerates files that are already gone.

use super::options::ArchiveOptions;
use super::UploadError;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// File name of the pipeline's own diagnostic log stream
pub const SYSTEM_LOG_FILE: &str = "system.log";

/// True for retired backups: `<base>.log.<n>`
fn is_backup_name(name: &str) -> bool {
    match name.rfind('.') {
        Some(idx) => {
            let (stem, suffix) = name.split_at(idx);
            stem.ends_with(".log")
                && !suffix[1..].is_empty()
                && suffix[1..].chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Active log name for either form: `app.log` and `app.log.3` both map to
/// `app.log`; anything else is not part of a log stream.
pub(crate) fn base_log_name(name: &str) -> Option<&str> {
    if name.ends_with(".log") {
        Some(name)
    } else if is_backup_name(name) {
        name.rfind('.').map(|idx| &name[..idx])
    } else {
        None
    }
}

fn created_at(path: &Path) -> io::Result<SystemTime> {
    let metadata = fs::metadata(path)?;
    // Creation time is not available on every filesystem
    metadata.created().or_else(|_| metadata.modified())
}

/// Enumerate the files in a logs directory that match the archive policy
///
/// # Errors
///
/// Returns an error if the directory cannot be read; per-file metadata
/// failures simply exclude the file.
pub fn select_log_files(dir: &Path, options: &ArchiveOptions) -> io::Result<Vec<PathBuf>> {
    let cutoff = options
        .max_age_days
        .map(|days| SystemTime::now() - Duration::from_secs(u64::from(days) * 86_400));

    let mut selected = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        let base = match base_log_name(&name) {
            Some(base) => base,
            None => continue,
        };

        if is_backup_name(&name) && !options.include_backups {
            continue;
        }
        if base == SYSTEM_LOG_FILE && !options.include_system {
            continue;
        }
        if let Some(cutoff) = cutoff {
            match created_at(&path) {
                Ok(created) if created < cutoff => continue,
                Ok(_) => {}
                Err(_) => continue,
            }
        }

        selected.push(path);
    }

    selected.sort();
    Ok(selected)
}

/// Isolated working subdirectory for one archive operation
///
/// Removed on `cleanup()` and again, best effort, on drop.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a fresh working subdirectory under the logs directory
    pub(crate) fn create(parent: &Path) -> io::Result<Self> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let root = parent.join(format!(".upload-{}-{}", std::process::id(), nanos));
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Remove the workspace and everything in it
    ///
    /// Idempotent: a workspace (or contents) that is already gone is not an
    /// error.
    pub fn cleanup(&self) {
        if let Err(e) = fs::remove_dir_all(&self.root) {
            if e.kind() != io::ErrorKind::NotFound {
                eprintln!(
                    "[LOGGER WARNING] Failed to remove upload workspace {}: {}",
                    self.root.display(),
                    e
                );
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// A packaged archive plus the workspace that holds it
///
/// Dropping the handle removes the workspace, so keep it alive for as long
/// as the zip file is needed.
#[derive(Debug)]
pub struct LogArchive {
    workspace: Workspace,
    path: PathBuf,
}

impl LogArchive {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the archive and its workspace
    pub fn cleanup(&self) {
        self.workspace.cleanup();
    }
}

/// Snapshot the selected files into a workspace and zip the copies
///
/// # Errors
///
/// Returns `ArchiveFailed` if the workspace, a copy, or the zip itself
/// cannot be produced.
pub fn build_archive(
    logs_dir: &Path,
    files: &[PathBuf],
    archive_name: &str,
) -> Result<LogArchive, UploadError> {
    let workspace = Workspace::create(logs_dir)
        .map_err(|e| UploadError::ArchiveFailed(format!("cannot create workspace: {}", e)))?;

    let mut copies = Vec::with_capacity(files.len());
    for source in files {
        let name = source
            .file_name()
            .ok_or_else(|| {
                UploadError::ArchiveFailed(format!("invalid log path: {}", source.display()))
            })?
            .to_os_string();
        let copy = workspace.path().join(&name);
        fs::copy(source, &copy).map_err(|e| {
            UploadError::ArchiveFailed(format!("cannot snapshot {}: {}", source.display(), e))
        })?;
        copies.push(copy);
    }

    let zip_path = workspace.path().join(format!("{}.zip", archive_name));
    write_zip(&zip_path, &copies)
        .map_err(|e| UploadError::ArchiveFailed(format!("cannot write archive: {}", e)))?;

    Ok(LogArchive {
        workspace,
        path: zip_path,
    })
}

fn write_zip(zip_path: &Path, files: &[PathBuf]) -> io::Result<()> {
    let file = File::create(zip_path)?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "non-UTF-8 file name"))?;
        writer.start_file(name, options)?;
        let mut source = File::open(path)?;
        io::copy(&mut source, &mut writer)?;
    }

    writer.finish()?;
    Ok(())
}
