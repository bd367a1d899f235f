#![warn(clippy::pedantic)]

//! # go-install
//!
//! Installs the official Go toolchain under `/usr/local/go` and puts its
//! `bin` directory on the user's `PATH`.
//!
//! A run checks the host for build prerequisites (offering to install any
//! that are missing), fetches the upstream release catalog, lets the user pick
//! a version unless one was given with `--version`, and then downloads,
//! verifies and unpacks the matching archive.
//!
//! ## Usage Modes
//!
//! ### Interactive Mode (default)
//!
//! In a terminal, `go-install` runs a full-screen TUI.
//!
//! ### Headless Mode (`--headless`)
//!
//! Prompts are read line by line from stdin and progress is written to
//! stderr. Used automatically when stdout is not a terminal or
//! `GO_INSTALL_NO_TUI` is set.
//!
//! ## Examples
//!
//! ```bash
//! sudo go-install
//! sudo go-install --version 1.22.1
//! ```

mod headless;
mod logging;
mod picker;
mod report;
mod tui;

use anyhow::Result;
use clap::Parser;
use goinst_engine::{InstallError, InstallerConfig, SessionOutcome};

/// Interactive installer for the Go toolchain.
#[derive(Parser)]
#[command(
    name = "go-install",
    author,
    disable_version_flag = true,
    about = "Install the Go toolchain",
    long_about = "Checks system dependencies, downloads the requested Go release from go.dev, \
    verifies its checksum and installs it to /usr/local/go.",
    after_help = "\
EXAMPLES:
    go-install                     Pick a version interactively
    go-install --version 1.22.1    Install Go 1.22.1

NOTE:
    This tool must be run as root (for example with sudo).

ENVIRONMENT VARIABLES:
    GO_INSTALL_NO_TUI           Disable interactive TUI
    GO_INSTALL_LOG              Log filter (default: warn)
    GO_INSTALL_LOG_FILE         Log file used while the TUI is active
                                (default: /var/log/go-install.log)
    GO_INSTALL_CATALOG_URL      Release catalog URL (default: https://go.dev/dl/?mode=json&include=all)
    GO_INSTALL_DIST_SERVER      Archive download base URL (default: https://go.dev/dl/)
    GO_INSTALL_PREFIX           Installation prefix (default: /usr/local)
    GO_INSTALL_DOWNLOAD_DIR     Download directory, must be private to root
                                (default: a fresh <tmp>/go-install-* per run)"
)]
pub struct Cli {
    /// Go version to install, e.g. `1.22.1` or `go1.22.1`.
    ///
    /// Without it, the available versions are offered for selection.
    #[clap(long = "version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Run in headless mode without TUI.
    #[clap(long = "headless", action = clap::ArgAction::SetTrue)]
    pub headless: bool,
}

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(outcome) => report::exit_code(&outcome),
        Err(e) => handle_error(&e),
    };
    std::process::exit(code);
}

/// Prints an error that stopped the program before a session could finish
/// and returns exit code 1.
///
/// Privilege failures are printed as their bare message.
fn handle_error(e: &anyhow::Error) -> i32 {
    if let Some(install_error @ InstallError::Privilege { .. }) = e.downcast_ref::<InstallError>()
    {
        eprintln!("{install_error}");
        return 1;
    }
    eprintln!("Error: {e:?}");
    1
}

/// Fails with [`InstallError::Privilege`] unless the effective user is root.
fn ensure_root() -> Result<(), InstallError> {
    // SAFETY: geteuid has no preconditions and cannot fail.
    if unsafe { libc::geteuid() } == 0 {
        Ok(())
    } else {
        Err(InstallError::privilege())
    }
}

async fn run() -> Result<SessionOutcome> {
    let cli = Cli::parse();
    ensure_root()?;

    let mut config = InstallerConfig::from_env();
    let _staging = config.stage_downloads()?;
    let interactive = !cli.headless && tui::should_use_tui();

    let _log_guard = if interactive {
        Some(logging::init_file()?)
    } else {
        logging::init_stderr();
        None
    };

    let outcome = if interactive {
        tui::run(config, cli.version).await?
    } else {
        headless::run(config, cli.version.as_deref()).await
    };

    report::print(&outcome);
    Ok(outcome)
}
