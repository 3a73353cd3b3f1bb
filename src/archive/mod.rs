//! Archive & upload service
//!
//! Selects log files per policy, packages them into a zip snapshot, and
//! transfers the archive to a remote endpoint with observable progress and
//! cooperative cancellation. Temporary artifacts are removed regardless of
//! outcome.

pub mod collect;
pub mod options;
pub mod upload;

pub use collect::{LogArchive, Workspace, SYSTEM_LOG_FILE};
pub use options::ArchiveOptions;
pub use upload::{DeviceInfo, UploadJob, Uploader, DEFAULT_UPLOAD_TIMEOUT};

use reqwest::Url;
use std::path::{Path, PathBuf};

/// Why an archive or upload operation did not produce a location
///
/// Returned as a value across the async boundary; the caller decides any
/// retry policy (none is automatic).
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The selection policy matched no files; no network activity occurred
    #[error("no log files matched the archive policy")]
    NoLogsFound,

    /// The snapshot or zip could not be produced
    #[error("failed to build log archive: {0}")]
    ArchiveFailed(String),

    /// Transport failure, timeout, or non-2xx response
    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// The server's response body could not be read
    #[error("server response could not be read")]
    InvalidServerResponse,
}

/// Terminal state of a transfer that ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The server accepted the archive; the parsed (or fallback) location
    Success(Url),
    /// The caller cancelled before completion
    Cancelled,
}

/// Archive & upload service over one logs directory
///
/// Reads files produced by the file writer, independent of live writers:
/// everything is copied into a workspace snapshot before packaging.
#[derive(Debug, Clone)]
pub struct Archiver {
    logs_dir: PathBuf,
}

impl Archiver {
    #[must_use]
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
        }
    }

    #[must_use]
    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Files the archive policy currently matches
    ///
    /// # Errors
    ///
    /// Returns `ArchiveFailed` if the logs directory cannot be read.
    pub fn selected_files(&self, options: &ArchiveOptions) -> Result<Vec<PathBuf>, UploadError> {
        collect::select_log_files(&self.logs_dir, options)
            .map_err(|e| UploadError::ArchiveFailed(format!("cannot list logs: {}", e)))
    }

    /// Snapshot and zip the matching log files
    ///
    /// The returned handle owns the workspace; the zip disappears when the
    /// handle is dropped or cleaned up, so share or upload it first.
    ///
    /// # Errors
    ///
    /// `NoLogsFound` if nothing matches, `ArchiveFailed` if packaging
    /// fails.
    pub fn prepare_logs_for_sharing(
        &self,
        options: &ArchiveOptions,
    ) -> Result<LogArchive, UploadError> {
        let files = self.selected_files(options)?;
        if files.is_empty() {
            return Err(UploadError::NoLogsFound);
        }
        collect::build_archive(&self.logs_dir, &files, &options.archive_name)
    }

    /// Archive the matching log files and upload them
    ///
    /// Short-circuits with `NoLogsFound` before any network activity when
    /// the selection is empty. The workspace is removed on success,
    /// failure, and cancellation alike.
    pub async fn upload_logs(
        &self,
        uploader: &Uploader,
        options: &ArchiveOptions,
        fields: &[(String, String)],
        device: &DeviceInfo,
        job: &UploadJob,
    ) -> Result<UploadOutcome, UploadError> {
        let archive = self.prepare_logs_for_sharing(options)?;
        let result = uploader
            .upload(
                &[archive.path().to_path_buf()],
                fields,
                device,
                job,
            )
            .await;
        archive.cleanup();
        result
    }
}
