//! Integration tests for the archive & upload service
//!
//! The upload tests run against a minimal in-process HTTP server so the
//! full multipart request, progress stream, and cleanup behavior are
//! exercised without touching the network.

use diaglog::prelude::*;
use reqwest::Url;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn seed_logs(dir: &Path) {
    fs::write(dir.join("app.log"), "[2026-08-06 10:00:00.000] [App] [INFO] alive (m.rs:1)\n")
        .unwrap();
    fs::write(dir.join("app.log.1"), "older lines\n").unwrap();
    fs::write(dir.join("system.log"), "internal diagnostics\n").unwrap();
}

fn workspace_dirs(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Accept one request, read it fully (Content-Length framed), respond with
/// the given status line and body, and hand the captured request back.
async fn mock_server(
    status: &'static str,
    body: &'static str,
) -> (SocketAddr, tokio::task::JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 8192];

        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before headers completed");
            request.extend_from_slice(&chunk[..n]);
            if let Some(pos) = find(&request, b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let headers = String::from_utf8_lossy(&request[..header_end]).to_string();
        let content_length: usize = headers
            .lines()
            .find_map(|line| {
                line.to_ascii_lowercase()
                    .strip_prefix("content-length:")
                    .map(|v| v.trim().parse().unwrap())
            })
            .expect("multipart request should be length-framed");

        while request.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed mid-body");
            request.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (addr, handle)
}

#[tokio::test]
async fn test_no_logs_found_short_circuits() {
    let dir = TempDir::new().unwrap();
    let archiver = Archiver::new(dir.path());
    // Nothing listens here; NoLogsFound must win before any connection
    let uploader = Uploader::new(Url::parse("http://127.0.0.1:1/upload").unwrap());

    let result = archiver
        .upload_logs(
            &uploader,
            &ArchiveOptions::default(),
            &[],
            &DeviceInfo::current(),
            &UploadJob::new(),
        )
        .await;

    assert!(matches!(result, Err(UploadError::NoLogsFound)));
    assert!(workspace_dirs(dir.path()).is_empty());
}

#[tokio::test]
async fn test_upload_success_with_parsed_location() {
    let dir = TempDir::new().unwrap();
    seed_logs(dir.path());

    let (addr, server) = mock_server(
        "200 OK",
        r#"{"url": "https://cdn.example.com/bundle.zip"}"#,
    )
    .await;

    let archiver = Archiver::new(dir.path());
    let uploader = Uploader::new(Url::parse(&format!("http://{}/upload", addr)).unwrap());
    let job = UploadJob::new();
    let progress = job.progress();

    let outcome = archiver
        .upload_logs(
            &uploader,
            &ArchiveOptions::default(),
            &[("ticket".to_string(), "T-1042".to_string())],
            &DeviceInfo::current(),
            &job,
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        UploadOutcome::Success(Url::parse("https://cdn.example.com/bundle.zip").unwrap())
    );
    assert!((*progress.borrow() - 1.0).abs() < f32::EPSILON);

    // The workspace is gone; only the seeded files remain
    assert!(workspace_dirs(dir.path()).is_empty());
    assert!(dir.path().join("app.log").exists());

    let request = server.await.unwrap();
    let request_text = String::from_utf8_lossy(&request);
    assert!(request_text.contains("multipart/form-data"));
    assert!(request_text.contains("name=\"ticket\""));
    assert!(request_text.contains("T-1042"));
    assert!(request_text.contains("name=\"device[model]\""));
    assert!(request_text.contains("name=\"device[timestamp]\""));
    assert!(request_text.contains("name=\"logs[]\""));
    assert!(request_text.contains("application/zip"));
    assert!(request_text.contains("diagnostics-logs.zip"));
}

#[tokio::test]
async fn test_upload_failure_on_server_error() {
    let dir = TempDir::new().unwrap();
    seed_logs(dir.path());

    let (addr, _server) = mock_server("500 Internal Server Error", "nope").await;

    let archiver = Archiver::new(dir.path());
    let uploader = Uploader::new(Url::parse(&format!("http://{}/upload", addr)).unwrap());

    let result = archiver
        .upload_logs(
            &uploader,
            &ArchiveOptions::default(),
            &[],
            &DeviceInfo::current(),
            &UploadJob::new(),
        )
        .await;

    assert!(matches!(result, Err(UploadError::UploadFailed(_))));
    assert!(workspace_dirs(dir.path()).is_empty());
}

#[tokio::test]
async fn test_plain_text_location_fallbacks() {
    let dir = TempDir::new().unwrap();
    seed_logs(dir.path());

    let (addr, _server) = mock_server("200 OK", "https://share.example.com/x\n").await;

    let archiver = Archiver::new(dir.path());
    let uploader = Uploader::new(Url::parse(&format!("http://{}/upload", addr)).unwrap());

    let outcome = archiver
        .upload_logs(
            &uploader,
            &ArchiveOptions::default(),
            &[],
            &DeviceInfo::current(),
            &UploadJob::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        UploadOutcome::Success(Url::parse("https://share.example.com/x").unwrap())
    );
}

#[tokio::test]
async fn test_cancelled_before_transfer() {
    let dir = TempDir::new().unwrap();
    seed_logs(dir.path());

    let archiver = Archiver::new(dir.path());
    let uploader = Uploader::new(Url::parse("http://127.0.0.1:1/upload").unwrap());
    let job = UploadJob::new();
    job.cancel();

    let outcome = archiver
        .upload_logs(
            &uploader,
            &ArchiveOptions::default(),
            &[],
            &DeviceInfo::current(),
            &job,
        )
        .await
        .unwrap();

    assert_eq!(outcome, UploadOutcome::Cancelled);
    assert!(workspace_dirs(dir.path()).is_empty());
}

#[tokio::test]
async fn test_cancel_in_flight_transfer() {
    let dir = TempDir::new().unwrap();
    seed_logs(dir.path());

    // A server that accepts the connection and then stalls forever
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(600)).await;
        drop(socket);
    });

    let archiver = Archiver::new(dir.path());
    let uploader = Uploader::new(Url::parse(&format!("http://{}/upload", addr)).unwrap());
    let job = Arc::new(UploadJob::new());
    let progress = job.progress();

    let task = tokio::spawn({
        let archiver = archiver.clone();
        let uploader = uploader.clone();
        let job = Arc::clone(&job);
        async move {
            archiver
                .upload_logs(
                    &uploader,
                    &ArchiveOptions::default(),
                    &[],
                    &DeviceInfo::current(),
                    &job,
                )
                .await
        }
    });

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    job.cancel();

    let outcome = task.await.unwrap().unwrap();
    assert_eq!(outcome, UploadOutcome::Cancelled);

    // Progress no longer advances once cancelled, and the workspace is gone
    let frozen = *progress.borrow();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(*progress.borrow(), frozen);
    assert!(workspace_dirs(dir.path()).is_empty());
}

#[tokio::test]
async fn test_backups_and_system_log_respect_policy() {
    let dir = TempDir::new().unwrap();
    seed_logs(dir.path());

    let archiver = Archiver::new(dir.path());

    let default_files = archiver.selected_files(&ArchiveOptions::default()).unwrap();
    let names: Vec<_> = default_files
        .iter()
        .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["app.log", "app.log.1"]);

    let everything = archiver
        .selected_files(&ArchiveOptions::new().with_system(true))
        .unwrap();
    assert_eq!(everything.len(), 3);

    let active_only = archiver
        .selected_files(&ArchiveOptions::new().with_backups(false))
        .unwrap();
    assert_eq!(active_only.len(), 1);
}
