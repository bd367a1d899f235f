//! The installation pipeline.
//!
//! A strictly linear stage machine:
//!
//! ```text
//! Downloading -> Verifying -> Removing -> Extracting -> Configuring -> Done
//!      \             \            \            \
//!       `-------------`------------`------------`----> Failed
//! ```
//!
//! Each stage is entered by issuing one [`Command`] and left only when that
//! command's outcome arrives. A stage never repeats and none is skipped, so the
//! previous installation is only removed after the archive has been verified,
//! and PATH is only configured after the new tree has been unpacked.
//!
//! Configuring cannot fail the pipeline. A PATH problem is recorded in the
//! [`InstallReport`] and the pipeline still reaches `Done`.

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::catalog::ReleaseCatalog;
use crate::config::InstallerConfig;
use crate::error::InstallError;
use crate::event::{Command, Event, InstallReport};
use crate::platform::Target;
use crate::select::{self, BuildSelection};
use crate::shell::PathSetup;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Downloading,
    Verifying,
    Removing,
    Extracting,
    Configuring,
    Done,
    Failed,
}

impl Stage {
    /// Short status line for progress displays.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Downloading => "Downloading Go archive...",
            Self::Verifying => "Verifying checksum...",
            Self::Removing => "Removing old installation...",
            Self::Extracting => "Extracting archive...",
            Self::Configuring => "Configuring environment...",
            Self::Done => "Installation complete",
            Self::Failed => "Installation failed",
        }
    }

    /// One-based position among the five working stages, if this is one.
    #[must_use]
    pub fn step(self) -> Option<(usize, usize)> {
        let index = match self {
            Self::Downloading => 1,
            Self::Verifying => 2,
            Self::Removing => 3,
            Self::Extracting => 4,
            Self::Configuring => 5,
            Self::Done | Self::Failed => return None,
        };
        Some((index, 5))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Downloading => "downloading",
            Self::Verifying => "verifying",
            Self::Removing => "removing",
            Self::Extracting => "extracting",
            Self::Configuring => "configuring",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Mutable state threaded through the pipeline.
///
/// Owned by the pipeline, which is in turn owned by the session. Steps only
/// ever receive copies of the fields they need inside a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineContext {
    /// Normalized version being installed.
    pub version: String,
    pub target: Target,
    /// Set once, filename and digest together.
    pub selection: Option<BuildSelection>,
    /// Local path of the downloaded archive.
    pub archive: Option<PathBuf>,
    pub error: Option<InstallError>,
}

/// Result of feeding the pipeline one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Dispatch this command and feed its outcome back.
    Continue(Command),
    /// The pipeline has stopped.
    Finished(Result<InstallReport, InstallError>),
    /// The event does not belong to the current stage and was dropped.
    Ignored,
}

/// The download-to-configure stage machine for one version.
#[derive(Debug, Clone)]
pub struct InstallPipeline {
    stage: Stage,
    context: PipelineContext,
    config: InstallerConfig,
}

impl InstallPipeline {
    /// Resolves `version` against `catalog` and enters `Downloading`.
    ///
    /// If the build cannot be selected the pipeline is created directly in
    /// `Failed` and the error is returned in [`Step::Finished`].
    #[must_use]
    pub fn start(config: &InstallerConfig, catalog: &ReleaseCatalog, version: &str) -> (Self, Step) {
        let target = config.target.clone();
        let mut pipeline = Self {
            stage: Stage::Downloading,
            context: PipelineContext {
                version: select::normalize_version(version),
                target: target.clone(),
                selection: None,
                archive: None,
                error: None,
            },
            config: config.clone(),
        };

        match select::select(catalog, version, &target.os, &target.arch) {
            Ok(selection) => {
                info!(version = %selection.version, filename = %selection.filename, "build selected");
                let command = Command::Download {
                    url: config.archive_url(&selection.filename),
                    dest: config.archive_path(&selection.filename),
                };
                pipeline.context.selection = Some(selection);
                debug!(stage = %pipeline.stage, "pipeline started");
                (pipeline, Step::Continue(command))
            }
            Err(e) => {
                let step = pipeline.fail(e);
                (pipeline, step)
            }
        }
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Feeds the outcome of the current stage's command.
    pub fn advance(&mut self, event: Event) -> Step {
        match (self.stage, event) {
            (Stage::Downloading, Event::Downloaded(result)) => match result {
                Ok(archive) => {
                    let sha256 = self
                        .context
                        .selection
                        .as_ref()
                        .map(|s| s.sha256.clone())
                        .unwrap_or_default();
                    self.context.archive = Some(archive.clone());
                    self.enter(Stage::Verifying, Command::Verify { archive, sha256 })
                }
                Err(e) => self.fail(e),
            },
            (Stage::Verifying, Event::Verified(result)) => match result {
                Ok(()) => self.enter(
                    Stage::Removing,
                    Command::RemoveInstall {
                        root: self.config.install_root(),
                    },
                ),
                Err(e) => self.fail(e),
            },
            (Stage::Removing, Event::Removed(result)) => match result {
                Ok(()) => {
                    let archive = self.context.archive.clone().unwrap_or_default();
                    self.enter(
                        Stage::Extracting,
                        Command::Extract {
                            archive,
                            dest: self.config.prefix.clone(),
                        },
                    )
                }
                Err(e) => self.fail(e),
            },
            (Stage::Extracting, Event::Extracted(result)) => match result {
                Ok(()) => self.enter(
                    Stage::Configuring,
                    Command::Configure {
                        bin_dir: self.config.bin_dir(),
                    },
                ),
                Err(e) => self.fail(e),
            },
            (Stage::Configuring, Event::Configured(path_setup)) => {
                if let PathSetup::Failed { reason } = &path_setup {
                    warn!(%reason, "PATH was not configured");
                }
                self.stage = Stage::Done;
                let report = InstallReport {
                    version: self.context.version.clone(),
                    install_root: self.config.install_root(),
                    bin_dir: self.config.bin_dir(),
                    path_setup,
                };
                info!(version = %report.version, root = %report.install_root.display(), "installation complete");
                Step::Finished(Ok(report))
            }
            (stage, event) => {
                warn!(%stage, ?event, "event does not match pipeline stage, ignoring");
                Step::Ignored
            }
        }
    }

    fn enter(&mut self, stage: Stage, command: Command) -> Step {
        debug!(from = %self.stage, to = %stage, "pipeline stage change");
        self.stage = stage;
        Step::Continue(command)
    }

    fn fail(&mut self, error: InstallError) -> Step {
        warn!(stage = %self.stage, %error, "pipeline failed");
        self.stage = Stage::Failed;
        self.context.error = Some(error.clone());
        Step::Finished(Err(error))
    }
}
