//! Tracing subscriber setup.
//!
//! The filter is read from `GO_INSTALL_LOG` and defaults to `warn`. While the
//! TUI owns the terminal, records go to a file so they never tear the screen;
//! otherwise they go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "GO_INSTALL_LOG";

/// Environment variable overriding the log file used in TUI mode.
pub const LOG_FILE_ENV: &str = "GO_INSTALL_LOG_FILE";

const DEFAULT_FILTER: &str = "warn";

/// Opened for append by root, so it must not sit in a world-writable directory.
const DEFAULT_LOG_FILE: &str = "/var/log/go-install.log";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log file used while the TUI is active.
fn log_file_path() -> PathBuf {
    std::env::var_os(LOG_FILE_ENV)
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from)
}

/// Logs to stderr.
pub fn init_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Logs to the file named by `GO_INSTALL_LOG_FILE`.
///
/// The returned guard flushes buffered records when dropped and must be kept
/// alive for as long as logging is needed.
///
/// # Errors
///
/// Returns an error if the log file cannot be created.
pub fn init_file() -> Result<WorkerGuard> {
    let path = log_file_path();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    let name = path
        .file_name()
        .with_context(|| format!("log file path has no file name: {}", path.display()))?
        .to_string_lossy()
        .into_owned();

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(&dir)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
