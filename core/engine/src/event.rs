//! Commands and events exchanged between the session and its executor.
//!
//! The session never performs I/O. It answers every [`Event`] with exactly one
//! [`Command`]; the executor carries the command out and answers with exactly
//! one event. Failures travel inside events as [`InstallError`] values and are
//! never thrown across the boundary.

use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::ReleaseCatalog;
use crate::deps::{DependencyReport, DistroInfo, MissingDependency};
use crate::error::InstallError;
use crate::platform::Target;
use crate::shell::PathSetup;

/// Work the session asks for next.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Detect the package manager and probe every prerequisite.
    CheckDependencies,
    /// Refresh the package index, then install `packages`.
    InstallDependencies {
        distro: DistroInfo,
        packages: Vec<String>,
    },
    /// Download and parse the release catalog.
    FetchCatalog,
    /// Report whether `root` exists.
    ProbeInstall { root: PathBuf },
    /// Stream `url` to `dest`.
    Download { url: String, dest: PathBuf },
    /// Compare the SHA-256 of `archive` with `sha256`.
    Verify { archive: PathBuf, sha256: String },
    /// Delete `root` recursively. Absence is success.
    RemoveInstall { root: PathBuf },
    /// Unpack `archive` into `dest`, then delete the archive.
    Extract { archive: PathBuf, dest: PathBuf },
    /// Add `bin_dir` to the user's shell PATH.
    Configure { bin_dir: PathBuf },
    /// Ask the user something.
    AwaitInput(Prompt),
    /// Nothing to dispatch; keep waiting for the in-flight outcome.
    Wait,
    /// The session is over.
    Exit(SessionOutcome),
}

impl Command {
    /// Whether the command is carried out asynchronously by the executor.
    #[must_use]
    pub fn is_effect(&self) -> bool {
        !matches!(self, Self::AwaitInput(_) | Self::Wait | Self::Exit(_))
    }
}

/// Everything the session reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    DependenciesChecked(Result<DependencyReport, InstallError>),
    DependenciesInstalled(Result<(), InstallError>),
    CatalogFetched(Result<ReleaseCatalog, InstallError>),
    /// `true` if the install root exists.
    InstallProbed(Result<bool, InstallError>),
    /// Carries the path of the downloaded archive.
    Downloaded(Result<PathBuf, InstallError>),
    Verified(Result<(), InstallError>),
    Removed(Result<(), InstallError>),
    Extracted(Result<(), InstallError>),
    /// PATH setup never fails the session, so it carries a report rather
    /// than a `Result`.
    Configured(PathSetup),
    Input(Input),
}

/// User input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Answer to a yes/no prompt.
    Confirm(bool),
    /// A version picked from the catalog.
    Select(String),
    /// Quit or interrupt.
    Quit,
}

/// A question the session needs answered before it can continue.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    /// Install the missing prerequisites with `command`?
    ConfirmDependencies {
        missing: Vec<MissingDependency>,
        command: String,
    },
    /// Pick a version. `notice` explains why a requested version was not used.
    SelectVersion {
        catalog: Arc<ReleaseCatalog>,
        target: Target,
        notice: Option<String>,
    },
    /// Replace the installation at `root` with `version`?
    ConfirmOverwrite { version: String, root: PathBuf },
}

/// What a finished installation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub version: String,
    pub install_root: PathBuf,
    pub bin_dir: PathBuf,
    pub path_setup: PathSetup,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Installed(InstallReport),
    Failed(InstallError),
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_work_commands_are_effects() {
        assert!(Command::FetchCatalog.is_effect());
        assert!(
            Command::RemoveInstall {
                root: PathBuf::from("/usr/local/go")
            }
            .is_effect()
        );
        assert!(!Command::Wait.is_effect());
        assert!(!Command::Exit(SessionOutcome::Cancelled).is_effect());
        assert!(
            !Command::AwaitInput(Prompt::ConfirmOverwrite {
                version: "go1.22.1".to_string(),
                root: PathBuf::from("/usr/local/go"),
            })
            .is_effect()
        );
    }
}
