//! HTTP archive download.
//!
//! Archives are streamed to `<dest>.tmp` and renamed into place once the body
//! has been fully written, so a partially downloaded file is never mistaken
//! for a complete one. There is a single attempt per call and no request
//! timeout.
//!
//! A downloaded archive is verified and later reopened by name for
//! extraction, so the directory it lives in must be private to the current
//! user. [`ensure_private_dir`] enforces that before anything is written.
//!
//! Progress is reported through a [`ProgressCallback`] so that the same code
//! serves both the terminal UI and the line-oriented frontend. Progress is
//! presentation telemetry only and never influences the session.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::catalog::USER_AGENT;
use crate::error::InstallError;

/// Progress event emitted during downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The server answered; `total` is the `Content-Length`, or 0 if unknown.
    Started { url: String, total: u64 },
    /// Download progress update.
    Progress {
        /// Bytes downloaded so far.
        downloaded: u64,
        /// Average speed since the start, in bytes per second.
        speed: u64,
    },
    /// The archive is complete and in place.
    Completed,
}

/// Callback type for receiving progress updates during downloads.
///
/// Wrapped in `Arc` so it can be cloned into the task performing the download.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Returns a callback that discards every event.
#[must_use]
pub fn silent() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Minimum interval between progress callback invocations in milliseconds.
const PROGRESS_CALLBACK_INTERVAL_MS: u128 = 100;

/// Downloads `url` to `dest`, reporting progress through `callback`.
///
/// The parent directory of `dest` is created if needed and must pass
/// [`ensure_private_dir`]. On failure the temporary file is removed and `dest`
/// is left untouched.
///
/// # Errors
///
/// - [`InstallError::Network`] if the request fails, the status is not 2xx or
///   the body stream breaks
/// - [`InstallError::Filesystem`] if the directory is not private, or the file
///   cannot be created, written or renamed
pub async fn download(
    url: &str,
    dest: &Path,
    callback: &ProgressCallback,
) -> Result<(), InstallError> {
    let temp_path = temp_path_for(dest);

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_private_dir(parent)?;
    }

    match stream_to_file(url, &temp_path, callback).await {
        Ok(()) => {
            tokio::fs::rename(&temp_path, dest).await.map_err(|e| {
                InstallError::io(
                    format!(
                        "Failed to rename {} to {}",
                        temp_path.display(),
                        dest.display()
                    ),
                    &e,
                )
            })?;
            callback(ProgressEvent::Completed);
            Ok(())
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&temp_path).await;
            Err(e)
        }
    }
}

/// Creates `dir` with mode `0700` if it is missing, then applies
/// [`check_private_dir`].
///
/// # Errors
///
/// Returns [`InstallError::Filesystem`] if the directory cannot be created or
/// is not private.
pub fn ensure_private_dir(dir: &Path) -> Result<(), InstallError> {
    create_private(dir).map_err(|e| {
        InstallError::io(format!("Failed to create directory {}", dir.display()), &e)
    })?;
    check_private_dir(dir)
}

/// Checks that `dir` is a real directory (not a symlink) owned by the
/// effective user and not writable by group or others.
///
/// # Errors
///
/// Returns [`InstallError::Filesystem`] naming the check that failed.
pub fn check_private_dir(dir: &Path) -> Result<(), InstallError> {
    let meta = std::fs::symlink_metadata(dir)
        .map_err(|e| InstallError::io(format!("Failed to inspect {}", dir.display()), &e))?;
    if !meta.is_dir() {
        return Err(InstallError::filesystem(format!(
            "Download directory {} is not a directory",
            dir.display()
        )));
    }
    check_ownership(dir, &meta)
}

#[cfg(unix)]
fn create_private(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
}

#[cfg(not(unix))]
fn create_private(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

#[cfg(unix)]
fn check_ownership(dir: &Path, meta: &std::fs::Metadata) -> Result<(), InstallError> {
    use std::os::unix::fs::MetadataExt;

    // SAFETY: geteuid has no preconditions and cannot fail.
    let euid = unsafe { libc::geteuid() };
    if meta.uid() != euid {
        return Err(InstallError::filesystem(format!(
            "Download directory {} is owned by uid {}, not the current user",
            dir.display(),
            meta.uid()
        )));
    }
    if meta.mode() & 0o022 != 0 {
        return Err(InstallError::filesystem(format!(
            "Download directory {} is writable by other users (mode {:o})",
            dir.display(),
            meta.mode() & 0o7777
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_ownership(_dir: &Path, _meta: &std::fs::Metadata) -> Result<(), InstallError> {
    Ok(())
}

fn temp_path_for(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    dest.with_file_name(name)
}

async fn stream_to_file(
    url: &str,
    dest: &Path,
    callback: &ProgressCallback,
) -> Result<(), InstallError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| InstallError::network(format!("Failed to create HTTP client: {e}")))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| InstallError::network(format!("Failed to connect to {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(InstallError::network(format!(
            "HTTP error {}: {url}",
            status.as_u16()
        )));
    }

    let total_size = response.content_length().unwrap_or(0);
    debug!(%url, total_size, "download started");
    callback(ProgressEvent::Started {
        url: url.to_string(),
        total: total_size,
    });

    let mut file = tokio::fs::File::create(dest).await.map_err(|e| {
        InstallError::io(format!("Failed to create file {}", dest.display()), &e)
    })?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;
    let start_time = Instant::now();
    let mut last_callback_time = Instant::now();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk
            .map_err(|e| InstallError::network(format!("Failed to read chunk from {url}: {e}")))?;
        file.write_all(&chunk).await.map_err(|e| {
            InstallError::io(format!("Failed to write to {}", dest.display()), &e)
        })?;

        downloaded += chunk.len() as u64;

        let now = Instant::now();
        if now.duration_since(last_callback_time).as_millis() >= PROGRESS_CALLBACK_INTERVAL_MS {
            callback(ProgressEvent::Progress {
                downloaded,
                speed: average_speed(downloaded, start_time),
            });
            last_callback_time = now;
        }
    }

    file.flush()
        .await
        .map_err(|e| InstallError::io(format!("Failed to flush {}", dest.display()), &e))?;

    callback(ProgressEvent::Progress {
        downloaded,
        speed: average_speed(downloaded, start_time),
    });
    debug!(%url, downloaded, "download finished");

    Ok(())
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn average_speed(downloaded: u64, start: Instant) -> u64 {
    let elapsed_secs = start.elapsed().as_secs_f64();
    if elapsed_secs > 0.0 {
        (downloaded as f64 / elapsed_secs) as u64
    } else {
        0
    }
}

/// Formats bytes into a human-readable string (KB, MB, GB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    #[allow(clippy::cast_precision_loss)]
    let bytes_f = bytes as f64;

    if bytes_f >= GB {
        format!("{:.2} GB", bytes_f / GB)
    } else if bytes_f >= MB {
        format!("{:.2} MB", bytes_f / MB)
    } else if bytes_f >= KB {
        format!("{:.2} KB", bytes_f / KB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn temp_path_keeps_full_extension() {
        let temp = temp_path_for(Path::new("/tmp/dl/go1.22.1.linux-amd64.tar.gz"));
        assert_eq!(
            temp,
            PathBuf::from("/tmp/dl/go1.22.1.linux-amd64.tar.gz.tmp")
        );
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(68_965_341), "65.77 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn progress_event_is_debug() {
        let event = ProgressEvent::Started {
            url: "test".to_string(),
            total: 100,
        };
        let debug_str = format!("{event:?}");
        assert!(debug_str.contains("Started"));
        assert!(debug_str.contains("100"));
    }

    #[tokio::test]
    async fn unreachable_server_leaves_no_files() {
        let temp = assert_fs::TempDir::new().unwrap();
        let dest = temp.path().join("nested").join("go.tar.gz");
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: ProgressCallback = Arc::new(move |e| sink.lock().unwrap().push(e));

        let err = download("http://127.0.0.1:1/go.tar.gz", &dest, &callback)
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::Network { .. }));
        assert!(!dest.exists());
        assert!(!temp_path_for(&dest).exists());
        assert!(events.lock().unwrap().is_empty());
    }

    #[cfg(unix)]
    mod private_dir {
        use super::*;
        use std::os::unix::fs::{MetadataExt, PermissionsExt};

        #[test]
        fn created_directory_is_owner_only() {
            let temp = assert_fs::TempDir::new().unwrap();
            let dir = temp.path().join("staging").join("downloads");

            ensure_private_dir(&dir).unwrap();

            let mode = std::fs::metadata(&dir).unwrap().mode() & 0o777;
            assert_eq!(mode, 0o700);
        }

        #[test]
        fn existing_private_directory_is_accepted() {
            let temp = assert_fs::TempDir::new().unwrap();
            let dir = temp.path().join("downloads");
            std::fs::create_dir(&dir).unwrap();
            std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o755)).unwrap();

            assert_eq!(ensure_private_dir(&dir), Ok(()));
        }

        #[test]
        fn world_writable_directory_is_rejected() {
            let temp = assert_fs::TempDir::new().unwrap();
            let dir = temp.path().join("go-install");
            std::fs::create_dir(&dir).unwrap();
            std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o777)).unwrap();

            let err = ensure_private_dir(&dir).unwrap_err();

            assert!(matches!(err, InstallError::Filesystem { .. }));
            assert!(err.to_string().contains("writable by other users"));
        }

        #[test]
        fn symlinked_directory_is_rejected() {
            let temp = assert_fs::TempDir::new().unwrap();
            let real = temp.path().join("elsewhere");
            std::fs::create_dir(&real).unwrap();
            let link = temp.path().join("go-install");
            std::os::unix::fs::symlink(&real, &link).unwrap();

            let err = ensure_private_dir(&link).unwrap_err();

            assert!(err.to_string().contains("is not a directory"));
        }

        #[test]
        fn directory_owned_by_another_user_is_rejected() {
            // Handing a directory to another user needs root.
            if unsafe { libc::geteuid() } != 0 {
                return;
            }
            let temp = assert_fs::TempDir::new().unwrap();
            let dir = temp.path().join("go-install");
            std::fs::create_dir(&dir).unwrap();
            std::os::unix::fs::chown(&dir, Some(65534), Some(65534)).unwrap();

            let err = ensure_private_dir(&dir).unwrap_err();

            assert!(err.to_string().contains("owned by uid 65534"));
        }

        #[tokio::test]
        async fn download_refuses_shared_directory_before_connecting() {
            let temp = assert_fs::TempDir::new().unwrap();
            let dir = temp.path().join("go-install");
            std::fs::create_dir(&dir).unwrap();
            std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o777)).unwrap();

            let err = download("http://127.0.0.1:1/go.tar.gz", &dir.join("go.tar.gz"), &silent())
                .await
                .unwrap_err();

            assert!(matches!(err, InstallError::Filesystem { .. }));
            assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
        }
    }
}
