//! Terminal user interface.
//!
//! ## Headless Detection
//!
//! The TUI is not used:
//! - When the `GO_INSTALL_NO_TUI` environment variable is set (any value)
//! - When stdout is not a terminal (piped or redirected)
//!
//! ## Modules
//!
//! - [`terminal`] - Terminal setup and cleanup with RAII guard
//! - [`app`] - Event loop and session dispatch
//! - [`state`] - Per-screen view state
//! - [`theme`] - Color theme system
//! - [`views`] - Screen rendering modules

pub mod app;
pub mod state;
pub mod terminal;
pub mod theme;
pub mod views;

use std::io::IsTerminal;
use std::sync::mpsc;

use anyhow::{Context, Result};
use goinst_engine::effects::HostEffects;
use goinst_engine::{InstallerConfig, Session, SessionOutcome};
use tokio::runtime::Handle;

use app::App;
use terminal::TerminalGuard;

/// Environment variable that disables the TUI.
pub const NO_TUI_ENV: &str = "GO_INSTALL_NO_TUI";

/// Whether the TUI should be used.
#[must_use]
pub fn should_use_tui() -> bool {
    if std::env::var_os(NO_TUI_ENV).is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Runs a whole session in the TUI.
///
/// The draw loop runs on a blocking thread; commands are spawned back onto
/// the current runtime.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or drawing fails.
pub async fn run(config: InstallerConfig, version: Option<String>) -> Result<SessionOutcome> {
    let runtime = Handle::current();

    tokio::task::spawn_blocking(move || {
        let (tx, rx) = mpsc::channel();
        let effects = HostEffects::new(config.clone(), app::progress_sender(tx.clone()));
        let session = Session::new(config, version.as_deref());
        let app = App::new(session, effects, runtime, tx, rx);

        let mut guard = TerminalGuard::new().context("failed to initialize terminal")?;
        app::run_app(&mut guard, app).context("TUI application error")
    })
    .await
    .context("TUI thread panicked")?
}
