//! Multipart upload with streamed progress and cooperative cancellation

use crate::core::record::TIMESTAMP_FORMAT;
use chrono::Local;
use futures::TryStreamExt;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Url};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;

use super::{UploadError, UploadOutcome};

/// Default per-upload timeout
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Device and application metadata carried in every upload
///
/// `current()` fills in what the host process can know about itself;
/// callers embedding the pipeline should override `app_version` and
/// `bundle_id` with their application's values.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub model: String,
    pub os_version: String,
    pub app_version: String,
    pub bundle_id: String,
}

impl DeviceInfo {
    #[must_use]
    pub fn current() -> Self {
        Self {
            model: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            os_version: std::env::consts::OS.to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            bundle_id: String::new(),
        }
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self::current()
    }
}

/// Control surface for one in-flight transfer
///
/// Owned by the caller that initiated the upload; the uploader does not
/// retain it beyond the call. Progress is published as bytes-sent over
/// bytes-expected in `[0, 1]`, monotonically non-decreasing, on a watch
/// channel any number of observers may subscribe to.
#[derive(Debug)]
pub struct UploadJob {
    progress: watch::Sender<f32>,
    cancel: CancellationToken,
}

impl UploadJob {
    #[must_use]
    pub fn new() -> Self {
        let (progress, _) = watch::channel(0.0);
        Self {
            progress,
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribe to progress updates
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<f32> {
        self.progress.subscribe()
    }

    /// Request cooperative cancellation of the transfer
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn publish(&self, ratio: f32) {
        // Progress never moves backwards, even if chunks are retried
        self.progress.send_if_modified(|current| {
            if ratio > *current {
                *current = ratio;
                true
            } else {
                false
            }
        });
    }
}

impl Default for UploadJob {
    fn default() -> Self {
        Self::new()
    }
}

/// Configured upload transport
///
/// Explicit object with a defined lifecycle: construct it with the
/// endpoint, hand references to whoever uploads. Not a process-wide
/// static.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: Client,
    endpoint: Url,
    headers: HeaderMap,
    timeout: Duration,
}

impl Uploader {
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            headers: HeaderMap::new(),
            timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    /// Set authentication or other headers sent with every upload
    #[must_use = "builder methods return a new value"]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the per-upload timeout (default 60 seconds)
    #[must_use = "builder methods return a new value"]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Upload archive files as one multipart request
    ///
    /// Parts, in order: caller metadata fields, `device[...]` metadata,
    /// then each file as a `logs[]` part with content type
    /// `application/zip`, streamed from disk with byte-counting progress.
    ///
    /// Returns `Ok(Cancelled)` if the job is cancelled before or during the
    /// transfer; a timeout or transport failure is `Err(UploadFailed)`.
    pub async fn upload(
        &self,
        files: &[PathBuf],
        fields: &[(String, String)],
        device: &DeviceInfo,
        job: &UploadJob,
    ) -> Result<UploadOutcome, UploadError> {
        if job.is_cancelled() {
            return Ok(UploadOutcome::Cancelled);
        }

        let mut total: u64 = 0;
        for path in files {
            let metadata = tokio::fs::metadata(path).await.map_err(|e| {
                UploadError::UploadFailed(format!("cannot read {}: {}", path.display(), e))
            })?;
            total += metadata.len();
        }

        let mut form = Form::new();
        for (key, value) in fields {
            form = form.text(key.clone(), value.clone());
        }
        form = form
            .text("device[model]", device.model.clone())
            .text("device[os_version]", device.os_version.clone())
            .text("device[app_version]", device.app_version.clone())
            .text("device[bundle_id]", device.bundle_id.clone())
            .text(
                "device[timestamp]",
                Local::now().format(TIMESTAMP_FORMAT).to_string(),
            );

        let sent = Arc::new(AtomicU64::new(0));
        for path in files {
            form = form.part("logs[]", self.file_part(path, total, &sent, job).await?);
        }

        let request = self
            .client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .timeout(self.timeout)
            .multipart(form);

        let response = tokio::select! {
            _ = job.cancel.cancelled() => return Ok(UploadOutcome::Cancelled),
            result = request.send() => result.map_err(|e| {
                if e.is_timeout() {
                    UploadError::UploadFailed(format!(
                        "timed out after {:?}", self.timeout
                    ))
                } else {
                    UploadError::UploadFailed(e.to_string())
                }
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::UploadFailed(format!(
                "server returned {}",
                status
            )));
        }

        let body = tokio::select! {
            _ = job.cancel.cancelled() => return Ok(UploadOutcome::Cancelled),
            body = response.text() => body.map_err(|_| UploadError::InvalidServerResponse)?,
        };

        job.publish(1.0);
        Ok(UploadOutcome::Success(parse_location(
            &body,
            &self.endpoint,
        )))
    }

    async fn file_part(
        &self,
        path: &Path,
        total: u64,
        sent: &Arc<AtomicU64>,
        job: &UploadJob,
    ) -> Result<Part, UploadError> {
        let file = tokio::fs::File::open(path).await.map_err(|e| {
            UploadError::UploadFailed(format!("cannot open {}: {}", path.display(), e))
        })?;
        let len = file
            .metadata()
            .await
            .map_err(|e| UploadError::UploadFailed(e.to_string()))?
            .len();

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("logs.zip")
            .to_string();

        let sent = Arc::clone(sent);
        let progress = job.progress.clone();
        let stream = ReaderStream::new(file).inspect_ok(move |chunk| {
            let done = sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
            let ratio = if total == 0 {
                1.0
            } else {
                (done as f32 / total as f32).min(1.0)
            };
            progress.send_if_modified(|current| {
                if ratio > *current {
                    *current = ratio;
                    true
                } else {
                    false
                }
            });
        });

        Part::stream_with_length(Body::wrap_stream(stream), len)
            .file_name(name)
            .mime_str("application/zip")
            .map_err(|e| UploadError::UploadFailed(e.to_string()))
    }
}

/// Extract the uploaded archive's location from a server response body
///
/// JSON bodies are checked for `url`, `link`, then `fileUrl`; otherwise the
/// body is treated as a plain-text URL; otherwise the configured endpoint
/// stands in.
fn parse_location(body: &str, endpoint: &Url) -> Url {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["url", "link", "fileUrl"] {
            if let Some(location) = value.get(key).and_then(|v| v.as_str()) {
                if let Ok(url) = Url::parse(location) {
                    return url;
                }
            }
        }
    }

    if let Ok(url) = Url::parse(body.trim()) {
        return url;
    }

    endpoint.clone()
}
