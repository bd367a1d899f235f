//! The session orchestrator.
//!
//! [`Session`] owns the whole installation state and decides every
//! transition. It is a pure controller: [`Session::handle`] takes one
//! [`Event`] and returns the one [`Command`] to run next, and it never performs
//! I/O itself. Probing for an existing installation is a command too.
//!
//! ```text
//! CheckingDependencies --satisfied--> FetchingCatalog
//!        | missing                          |
//!        v                                  v
//! ConfirmDependencies --yes--> InstallingDependencies
//!        | no -> Failed                     |
//!                                           v
//!                         (pre-selected & resolvable?) --no--> SelectingVersion
//!                                           | yes                    |
//!                                           v                        v
//!                                    ProbingInstall <----------------'
//!                                           | exists -> ConfirmOverwrite --no--> Failed
//!                                           v                 | yes
//!                                      Installing(stage) <----'
//!                                           v
//!                                         Done
//! ```
//!
//! Quitting at a prompt ends the session at once. Quitting while work is in
//! flight only marks the session; the in-flight outcome is still received and
//! then nothing further is dispatched.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::ReleaseCatalog;
use crate::config::InstallerConfig;
use crate::deps::{DependencyReport, DistroInfo};
use crate::error::InstallError;
use crate::event::{Command, Event, Input, InstallReport, Prompt, SessionOutcome};
use crate::pipeline::{InstallPipeline, Stage, Step};
use crate::select;

/// Message used when the user refuses to install prerequisites.
pub const DEPENDENCIES_DECLINED: &str = "dependencies are required for Go installation";

/// Message used when the user refuses to replace an existing installation.
pub const OVERWRITE_DECLINED: &str = "existing Go installation kept, nothing was changed";

/// Where the session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    CheckingDependencies,
    ConfirmDependencies,
    InstallingDependencies,
    FetchingCatalog,
    SelectingVersion,
    ProbingInstall,
    ConfirmOverwrite,
    Installing(Stage),
    Done,
    Failed,
    Cancelled,
}

impl SessionState {
    /// Whether the session is waiting for the user.
    #[must_use]
    pub fn is_interactive(self) -> bool {
        matches!(
            self,
            Self::ConfirmDependencies | Self::SelectingVersion | Self::ConfirmOverwrite
        )
    }

    /// Whether the session is waiting for an in-flight command.
    #[must_use]
    pub fn is_busy(self) -> bool {
        !self.is_interactive() && !self.is_terminal()
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }

    /// Status line for busy states.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::CheckingDependencies => "Checking system dependencies...",
            Self::ConfirmDependencies => "Missing dependencies",
            Self::InstallingDependencies => "Installing dependencies...",
            Self::FetchingCatalog => "Fetching available Go versions...",
            Self::SelectingVersion => "Select Go Version",
            Self::ProbingInstall => "Checking existing installation...",
            Self::ConfirmOverwrite => "Existing installation found",
            Self::Installing(stage) => stage.description(),
            Self::Done => "Installation complete",
            Self::Failed => "Installation failed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// One installation session.
#[derive(Debug)]
pub struct Session {
    config: InstallerConfig,
    state: SessionState,
    /// Version supplied up front, normalized.
    requested: Option<String>,
    /// Version the pipeline will install.
    chosen: Option<String>,
    distro: Option<DistroInfo>,
    dependencies: Option<DependencyReport>,
    catalog: Option<Arc<ReleaseCatalog>>,
    notice: Option<String>,
    pipeline: Option<InstallPipeline>,
    pending_cancel: bool,
    outcome: Option<SessionOutcome>,
}

impl Session {
    /// Creates a session. `requested` is a version supplied up front, if any.
    #[must_use]
    pub fn new(config: InstallerConfig, requested: Option<&str>) -> Self {
        let requested = requested
            .map(select::normalize_version)
            .filter(|v| !v.is_empty());
        Self {
            config,
            state: SessionState::CheckingDependencies,
            requested,
            chosen: None,
            distro: None,
            dependencies: None,
            catalog: None,
            notice: None,
            pipeline: None,
            pending_cancel: false,
            outcome: None,
        }
    }

    /// The first command of every session.
    #[must_use]
    pub fn start(&self) -> Command {
        info!(requested = ?self.requested, target = %self.config.target, "session started");
        Command::CheckDependencies
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    #[must_use]
    pub fn chosen_version(&self) -> Option<&str> {
        self.chosen.as_deref()
    }

    #[must_use]
    pub fn catalog(&self) -> Option<&Arc<ReleaseCatalog>> {
        self.catalog.as_ref()
    }

    /// Why a pre-selected version fell back to the picker.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    #[must_use]
    pub fn pipeline(&self) -> Option<&InstallPipeline> {
        self.pipeline.as_ref()
    }

    /// Whether a quit arrived while work was in flight.
    #[must_use]
    pub fn pending_cancel(&self) -> bool {
        self.pending_cancel
    }

    /// Final outcome, once the session is over.
    #[must_use]
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    /// Consumes one event and returns the next command.
    pub fn handle(&mut self, event: Event) -> Command {
        debug!(state = ?self.state, event = event_name(&event), "handling event");

        if let Some(outcome) = &self.outcome {
            warn!(state = ?self.state, "event received after session ended");
            return Command::Exit(outcome.clone());
        }

        if let Event::Input(Input::Quit) = event {
            return self.quit();
        }

        if self.pending_cancel && self.state.is_busy() && !self.is_final_outcome(&event) {
            info!(state = ?self.state, "honouring cancellation after in-flight work");
            return self.cancel();
        }

        match self.state {
            SessionState::CheckingDependencies => self.on_dependencies_checked(event),
            SessionState::ConfirmDependencies => self.on_dependencies_confirmed(event),
            SessionState::InstallingDependencies => self.on_dependencies_installed(event),
            SessionState::FetchingCatalog => self.on_catalog_fetched(event),
            SessionState::SelectingVersion => self.on_version_selected(event),
            SessionState::ProbingInstall => self.on_install_probed(event),
            SessionState::ConfirmOverwrite => self.on_overwrite_confirmed(event),
            SessionState::Installing(_) => self.on_pipeline_event(event),
            SessionState::Done | SessionState::Failed | SessionState::Cancelled => Command::Wait,
        }
    }

    /// The prompt for the current interactive state.
    #[must_use]
    pub fn prompt(&self) -> Option<Prompt> {
        match self.state {
            SessionState::ConfirmDependencies => {
                let report = self.dependencies.as_ref()?;
                Some(Prompt::ConfirmDependencies {
                    missing: report.missing.clone(),
                    command: report.remediation_command(),
                })
            }
            SessionState::SelectingVersion => Some(Prompt::SelectVersion {
                catalog: Arc::clone(self.catalog.as_ref()?),
                target: self.config.target.clone(),
                notice: self.notice.clone(),
            }),
            SessionState::ConfirmOverwrite => Some(Prompt::ConfirmOverwrite {
                version: self.chosen.clone()?,
                root: self.config.install_root(),
            }),
            _ => None,
        }
    }

    fn on_dependencies_checked(&mut self, event: Event) -> Command {
        let Event::DependenciesChecked(result) = event else {
            return self.unexpected(event);
        };
        match result {
            Ok(report) => {
                self.distro = Some(report.distro.clone());
                if report.is_satisfied() {
                    info!(distro = %report.distro.name, "all dependencies present");
                    self.dependencies = Some(report);
                    self.fetch_catalog()
                } else {
                    info!(missing = report.missing.len(), "dependencies missing");
                    self.dependencies = Some(report);
                    self.ask(SessionState::ConfirmDependencies)
                }
            }
            Err(e) => self.fail(e),
        }
    }

    fn on_dependencies_confirmed(&mut self, event: Event) -> Command {
        match event {
            Event::Input(Input::Confirm(true)) => {
                let Some(distro) = self.distro.clone() else {
                    return self.fail(InstallError::dependency("distribution was not detected"));
                };
                let packages = self
                    .dependencies
                    .as_ref()
                    .map(DependencyReport::packages)
                    .unwrap_or_default();
                self.state = SessionState::InstallingDependencies;
                Command::InstallDependencies { distro, packages }
            }
            Event::Input(Input::Confirm(false)) => {
                self.fail(InstallError::user_declined(DEPENDENCIES_DECLINED))
            }
            other => self.unexpected(other),
        }
    }

    fn on_dependencies_installed(&mut self, event: Event) -> Command {
        match event {
            Event::DependenciesInstalled(Ok(())) => {
                info!("dependencies installed");
                self.fetch_catalog()
            }
            Event::DependenciesInstalled(Err(e)) => self.fail(e),
            other => self.unexpected(other),
        }
    }

    fn on_catalog_fetched(&mut self, event: Event) -> Command {
        let Event::CatalogFetched(result) = event else {
            return self.unexpected(event);
        };
        let catalog = match result {
            Ok(catalog) if catalog.is_empty() => {
                return self.fail(InstallError::parse("release catalog contains no releases"));
            }
            Ok(catalog) => Arc::new(catalog),
            Err(e) => return self.fail(e),
        };
        self.catalog = Some(Arc::clone(&catalog));

        let Some(requested) = self.requested.clone() else {
            return self.ask(SessionState::SelectingVersion);
        };

        let target = &self.config.target;
        match select::select(&catalog, &requested, &target.os, &target.arch) {
            Ok(selection) => {
                debug!(version = %selection.version, "requested version resolves for this platform");
                self.chosen = Some(selection.version);
                self.probe_install()
            }
            Err(e) => {
                let notice = match &e {
                    InstallError::VersionNotFound { version } => {
                        format!("Version {version} was not found. Please pick another version.")
                    }
                    InstallError::PlatformNotAvailable { version, os, arch } => format!(
                        "Version {version} has no archive for {os}/{arch}. Please pick another version."
                    ),
                    other => other.to_string(),
                };
                info!(%e, "requested version unavailable, falling back to picker");
                self.notice = Some(notice);
                self.ask(SessionState::SelectingVersion)
            }
        }
    }

    fn on_version_selected(&mut self, event: Event) -> Command {
        match event {
            Event::Input(Input::Select(version)) => {
                let version = select::normalize_version(&version);
                if version.is_empty() {
                    return self.ask(SessionState::SelectingVersion);
                }
                info!(%version, "version selected");
                self.chosen = Some(version);
                self.probe_install()
            }
            other => self.unexpected(other),
        }
    }

    fn on_install_probed(&mut self, event: Event) -> Command {
        match event {
            Event::InstallProbed(Ok(true)) => {
                info!(root = %self.config.install_root().display(), "existing installation found");
                self.ask(SessionState::ConfirmOverwrite)
            }
            Event::InstallProbed(Ok(false)) => self.start_pipeline(),
            Event::InstallProbed(Err(e)) => self.fail(e),
            other => self.unexpected(other),
        }
    }

    fn on_overwrite_confirmed(&mut self, event: Event) -> Command {
        match event {
            Event::Input(Input::Confirm(true)) => self.start_pipeline(),
            Event::Input(Input::Confirm(false)) => {
                self.fail(InstallError::user_declined(OVERWRITE_DECLINED))
            }
            other => self.unexpected(other),
        }
    }

    fn on_pipeline_event(&mut self, event: Event) -> Command {
        let Some(pipeline) = self.pipeline.as_mut() else {
            return self.unexpected(event);
        };
        let step = pipeline.advance(event);
        let stage = pipeline.stage();
        self.after_step(stage, step)
    }

    fn start_pipeline(&mut self) -> Command {
        let (Some(catalog), Some(version)) = (self.catalog.clone(), self.chosen.clone()) else {
            return self.fail(InstallError::version_not_found(
                self.chosen.clone().unwrap_or_default(),
            ));
        };
        let (pipeline, step) = InstallPipeline::start(&self.config, &catalog, &version);
        let stage = pipeline.stage();
        self.pipeline = Some(pipeline);
        self.after_step(stage, step)
    }

    fn after_step(&mut self, stage: Stage, step: Step) -> Command {
        match step {
            Step::Continue(command) => {
                self.state = SessionState::Installing(stage);
                command
            }
            Step::Finished(Ok(report)) => self.finish(report),
            Step::Finished(Err(e)) => self.fail(e),
            Step::Ignored => Command::Wait,
        }
    }

    fn fetch_catalog(&mut self) -> Command {
        self.state = SessionState::FetchingCatalog;
        Command::FetchCatalog
    }

    fn probe_install(&mut self) -> Command {
        self.state = SessionState::ProbingInstall;
        Command::ProbeInstall {
            root: self.config.install_root(),
        }
    }

    fn ask(&mut self, state: SessionState) -> Command {
        self.state = state;
        match self.prompt() {
            Some(prompt) => Command::AwaitInput(prompt),
            None => {
                warn!(?state, "no prompt data for interactive state");
                Command::Wait
            }
        }
    }

    /// Answers an event that does not belong to the current state.
    ///
    /// Interactive states repeat their prompt; busy states keep waiting for
    /// their own outcome.
    fn unexpected(&mut self, event: Event) -> Command {
        warn!(state = ?self.state, event = event_name(&event), "unexpected event, ignoring");
        if self.state.is_interactive() {
            self.ask(self.state)
        } else {
            Command::Wait
        }
    }

    fn quit(&mut self) -> Command {
        if self.state.is_busy() {
            info!(state = ?self.state, "cancellation requested, waiting for in-flight work");
            self.pending_cancel = true;
            Command::Wait
        } else {
            self.cancel()
        }
    }

    /// True for an outcome that ends the session on its own, which a
    /// pending cancellation does not override.
    fn is_final_outcome(&self, event: &Event) -> bool {
        matches!(
            (self.state, event),
            (SessionState::Installing(Stage::Configuring), Event::Configured(_))
        )
    }

    fn cancel(&mut self) -> Command {
        self.state = SessionState::Cancelled;
        self.exit(SessionOutcome::Cancelled)
    }

    fn fail(&mut self, error: InstallError) -> Command {
        warn!(kind = error.kind(), %error, "session failed");
        self.state = SessionState::Failed;
        self.exit(SessionOutcome::Failed(error))
    }

    fn finish(&mut self, report: InstallReport) -> Command {
        self.state = SessionState::Done;
        self.exit(SessionOutcome::Installed(report))
    }

    fn exit(&mut self, outcome: SessionOutcome) -> Command {
        self.outcome = Some(outcome.clone());
        Command::Exit(outcome)
    }
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::DependenciesChecked(_) => "dependencies-checked",
        Event::DependenciesInstalled(_) => "dependencies-installed",
        Event::CatalogFetched(_) => "catalog-fetched",
        Event::InstallProbed(_) => "install-probed",
        Event::Downloaded(_) => "downloaded",
        Event::Verified(_) => "verified",
        Event::Removed(_) => "removed",
        Event::Extracted(_) => "extracted",
        Event::Configured(_) => "configured",
        Event::Input(Input::Confirm(_)) => "input-confirm",
        Event::Input(Input::Select(_)) => "input-select",
        Event::Input(Input::Quit) => "input-quit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FileEntry, Release};
    use crate::deps::{MissingDependency, PackageManager};
    use crate::platform::Target;
    use crate::shell::PathSetup;

    fn config() -> InstallerConfig {
        InstallerConfig {
            catalog_url: "http://catalog.test".to_string(),
            dist_server: "http://dist.test/dl".to_string(),
            prefix: PathBuf::from("/opt/prefix"),
            download_dir: PathBuf::from("/tmp/dl"),
            target: Target::new("linux", "amd64"),
        }
    }

    fn catalog() -> ReleaseCatalog {
        let archive = |version: &str, os: &str, arch: &str| FileEntry {
            filename: format!("{version}.{os}-{arch}.tar.gz"),
            os: os.to_string(),
            arch: arch.to_string(),
            kind: "archive".to_string(),
            sha256: format!("sha-{version}"),
            size: None,
        };
        ReleaseCatalog::new(vec![
            Release {
                version: "go1.22.1".to_string(),
                stable: Some(true),
                files: vec![archive("go1.22.1", "linux", "amd64")],
            },
            Release {
                version: "go1.4".to_string(),
                stable: Some(true),
                files: vec![archive("go1.4", "darwin", "amd64")],
            },
        ])
    }

    fn satisfied() -> DependencyReport {
        DependencyReport {
            distro: DistroInfo::new(PackageManager::AptGet, "debian"),
            missing: vec![],
        }
    }

    fn missing_gcc(required: bool) -> DependencyReport {
        DependencyReport {
            distro: DistroInfo::new(PackageManager::AptGet, "debian"),
            missing: vec![MissingDependency {
                name: "GCC".to_string(),
                required,
                packages: vec!["build-essential".to_string()],
            }],
        }
    }

    /// Drives a session up to the catalog being fetched.
    fn at_catalog(requested: Option<&str>) -> (Session, Command) {
        let mut session = Session::new(config(), requested);
        assert_eq!(session.start(), Command::CheckDependencies);
        assert_eq!(
            session.handle(Event::DependenciesChecked(Ok(satisfied()))),
            Command::FetchCatalog
        );
        let command = session.handle(Event::CatalogFetched(Ok(catalog())));
        (session, command)
    }

    #[test]
    fn missing_dependencies_prompt_with_command() {
        let mut session = Session::new(config(), None);
        let command = session.handle(Event::DependenciesChecked(Ok(missing_gcc(true))));
        assert_eq!(session.state(), SessionState::ConfirmDependencies);
        match command {
            Command::AwaitInput(Prompt::ConfirmDependencies { missing, command }) => {
                assert_eq!(missing.len(), 1);
                assert_eq!(command, "sudo apt-get install -y build-essential");
            }
            other => panic!("expected dependency prompt, got {other:?}"),
        }
    }

    #[test]
    fn accepting_dependencies_reuses_detected_distro() {
        let mut session = Session::new(config(), None);
        session.handle(Event::DependenciesChecked(Ok(missing_gcc(true))));
        let command = session.handle(Event::Input(Input::Confirm(true)));
        assert_eq!(
            command,
            Command::InstallDependencies {
                distro: DistroInfo::new(PackageManager::AptGet, "debian"),
                packages: vec!["build-essential".to_string()],
            }
        );
        assert_eq!(
            session.handle(Event::DependenciesInstalled(Ok(()))),
            Command::FetchCatalog
        );
    }

    #[test]
    fn declining_optional_dependencies_is_still_fatal() {
        let mut session = Session::new(config(), None);
        session.handle(Event::DependenciesChecked(Ok(missing_gcc(false))));
        let command = session.handle(Event::Input(Input::Confirm(false)));
        assert_eq!(
            command,
            Command::Exit(SessionOutcome::Failed(InstallError::user_declined(
                DEPENDENCIES_DECLINED
            )))
        );
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[test]
    fn dependency_detection_failure_is_fatal() {
        let mut session = Session::new(config(), None);
        let err = InstallError::dependency("unable to detect package manager");
        let command = session.handle(Event::DependenciesChecked(Err(err.clone())));
        assert_eq!(command, Command::Exit(SessionOutcome::Failed(err)));
    }

    #[test]
    fn no_requested_version_opens_picker() {
        let (session, command) = at_catalog(None);
        assert_eq!(session.state(), SessionState::SelectingVersion);
        assert!(matches!(
            command,
            Command::AwaitInput(Prompt::SelectVersion { notice: None, .. })
        ));
    }

    #[test]
    fn resolvable_requested_version_probes_install_root() {
        let (session, command) = at_catalog(Some("1.22.1"));
        assert_eq!(
            command,
            Command::ProbeInstall {
                root: PathBuf::from("/opt/prefix/go")
            }
        );
        assert_eq!(session.chosen_version(), Some("go1.22.1"));
    }

    #[test]
    fn unknown_requested_version_falls_back_with_notice() {
        let (session, command) = at_catalog(Some("9.9.9"));
        match command {
            Command::AwaitInput(Prompt::SelectVersion { notice, .. }) => {
                assert!(notice.unwrap().contains("go9.9.9 was not found"));
            }
            other => panic!("expected picker, got {other:?}"),
        }
        assert_eq!(session.state(), SessionState::SelectingVersion);
    }

    #[test]
    fn unavailable_platform_falls_back_with_distinct_notice() {
        let (session, _) = at_catalog(Some("go1.4"));
        let notice = session.notice().unwrap();
        assert!(notice.contains("no archive for linux/amd64"));
    }

    #[test]
    fn existing_install_requires_confirmation() {
        let (mut session, _) = at_catalog(Some("1.22.1"));
        let command = session.handle(Event::InstallProbed(Ok(true)));
        assert_eq!(
            command,
            Command::AwaitInput(Prompt::ConfirmOverwrite {
                version: "go1.22.1".to_string(),
                root: PathBuf::from("/opt/prefix/go"),
            })
        );

        let command = session.handle(Event::Input(Input::Confirm(true)));
        assert!(matches!(command, Command::Download { .. }));
        assert_eq!(
            session.state(),
            SessionState::Installing(Stage::Downloading)
        );
    }

    #[test]
    fn declining_overwrite_is_user_declined() {
        let (mut session, _) = at_catalog(Some("1.22.1"));
        session.handle(Event::InstallProbed(Ok(true)));
        let command = session.handle(Event::Input(Input::Confirm(false)));
        assert!(matches!(
            command,
            Command::Exit(SessionOutcome::Failed(InstallError::UserDeclined { .. }))
        ));
        assert!(session.pipeline().is_none());
    }

    #[test]
    fn picked_version_without_archive_fails_in_pipeline() {
        let (mut session, _) = at_catalog(None);
        session.handle(Event::Input(Input::Select("go1.4".to_string())));
        let command = session.handle(Event::InstallProbed(Ok(false)));
        assert_eq!(
            command,
            Command::Exit(SessionOutcome::Failed(InstallError::platform_not_available(
                "go1.4", "linux", "amd64"
            )))
        );
    }

    #[test]
    fn full_pipeline_reaches_done() {
        let (mut session, _) = at_catalog(Some("1.22.1"));
        session.handle(Event::InstallProbed(Ok(false)));
        let archive = PathBuf::from("/tmp/dl/go1.22.1.linux-amd64.tar.gz");
        session.handle(Event::Downloaded(Ok(archive)));
        session.handle(Event::Verified(Ok(())));
        session.handle(Event::Removed(Ok(())));
        session.handle(Event::Extracted(Ok(())));
        let command = session.handle(Event::Configured(PathSetup::AlreadyConfigured {
            profile: PathBuf::from("/root/.bashrc"),
        }));
        match command {
            Command::Exit(SessionOutcome::Installed(report)) => {
                assert_eq!(report.version, "go1.22.1");
                assert_eq!(report.bin_dir, PathBuf::from("/opt/prefix/go/bin"));
            }
            other => panic!("expected installed, got {other:?}"),
        }
        assert_eq!(session.state(), SessionState::Done);
    }

    #[test]
    fn quit_at_prompt_cancels_immediately() {
        let (mut session, _) = at_catalog(None);
        let command = session.handle(Event::Input(Input::Quit));
        assert_eq!(command, Command::Exit(SessionOutcome::Cancelled));
        assert_eq!(session.state(), SessionState::Cancelled);
    }

    #[test]
    fn quit_while_busy_waits_for_outcome_then_stops() {
        let (mut session, _) = at_catalog(Some("1.22.1"));
        session.handle(Event::InstallProbed(Ok(false)));

        assert_eq!(session.handle(Event::Input(Input::Quit)), Command::Wait);
        assert!(session.pending_cancel());
        assert_eq!(
            session.state(),
            SessionState::Installing(Stage::Downloading)
        );

        let archive = PathBuf::from("/tmp/dl/go1.22.1.linux-amd64.tar.gz");
        let command = session.handle(Event::Downloaded(Ok(archive)));
        assert_eq!(command, Command::Exit(SessionOutcome::Cancelled));
    }

    #[test]
    fn quit_during_configuration_still_reports_install() {
        let (mut session, _) = at_catalog(Some("1.22.1"));
        session.handle(Event::InstallProbed(Ok(false)));
        session.handle(Event::Downloaded(Ok(PathBuf::from("/tmp/dl/a.tar.gz"))));
        session.handle(Event::Verified(Ok(())));
        session.handle(Event::Removed(Ok(())));
        session.handle(Event::Extracted(Ok(())));
        session.handle(Event::Input(Input::Quit));

        let command = session.handle(Event::Configured(PathSetup::Failed {
            reason: "none".to_string(),
        }));
        assert!(matches!(command, Command::Exit(SessionOutcome::Installed(_))));
    }

    #[test]
    fn unexpected_input_repeats_prompt() {
        let (mut session, first) = at_catalog(None);
        let again = session.handle(Event::Input(Input::Confirm(true)));
        assert_eq!(first, again);
    }

    #[test]
    fn events_after_exit_repeat_outcome() {
        let (mut session, _) = at_catalog(None);
        session.handle(Event::Input(Input::Quit));
        assert_eq!(
            session.handle(Event::Verified(Ok(()))),
            Command::Exit(SessionOutcome::Cancelled)
        );
    }

    #[test]
    fn empty_catalog_is_fatal() {
        let mut session = Session::new(config(), None);
        session.handle(Event::DependenciesChecked(Ok(satisfied())));
        let command = session.handle(Event::CatalogFetched(Ok(ReleaseCatalog::default())));
        assert!(matches!(
            command,
            Command::Exit(SessionOutcome::Failed(InstallError::Parse { .. }))
        ));
    }
}
