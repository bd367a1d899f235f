//! Effect execution.
//!
//! [`Effects`] is the seam between the pure [`Session`](crate::session::Session)
//! and the host: one async method per kind of work a [`Command`] can request.
//! [`HostEffects`] performs the work for real; tests substitute recording
//! fakes. [`execute`] maps a command onto the matching method and wraps the
//! result in the matching [`Event`].

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::catalog::{self, ReleaseCatalog};
use crate::config::InstallerConfig;
use crate::deps::{self, DependencyReport, DistroInfo};
use crate::download::{self, ProgressCallback};
use crate::error::InstallError;
use crate::event::{Command, Event};
use crate::extract;
use crate::shell::{self, PathSetup, Shell};
use crate::verify;

/// Host operations the session can request.
pub trait Effects: Send + Sync {
    fn check_dependencies(
        &self,
    ) -> impl Future<Output = Result<DependencyReport, InstallError>> + Send;

    fn install_dependencies(
        &self,
        distro: &DistroInfo,
        packages: &[String],
    ) -> impl Future<Output = Result<(), InstallError>> + Send;

    fn fetch_catalog(&self) -> impl Future<Output = Result<ReleaseCatalog, InstallError>> + Send;

    /// Resolves to `true` if `root` exists.
    fn probe_install(&self, root: &Path) -> impl Future<Output = Result<bool, InstallError>> + Send;

    /// Resolves to the path of the complete archive.
    fn download(
        &self,
        url: &str,
        dest: &Path,
    ) -> impl Future<Output = Result<PathBuf, InstallError>> + Send;

    fn verify(
        &self,
        archive: &Path,
        sha256: &str,
    ) -> impl Future<Output = Result<(), InstallError>> + Send;

    fn remove_install(&self, root: &Path) -> impl Future<Output = Result<(), InstallError>> + Send;

    fn extract(
        &self,
        archive: &Path,
        dest: &Path,
    ) -> impl Future<Output = Result<(), InstallError>> + Send;

    fn configure(&self, bin_dir: &Path) -> impl Future<Output = PathSetup> + Send;
}

/// Runs one command and returns its outcome.
///
/// Returns `None` for commands that are not host work
/// ([`Command::AwaitInput`], [`Command::Wait`] and [`Command::Exit`]).
pub async fn execute<E: Effects>(effects: &E, command: Command) -> Option<Event> {
    let event = match command {
        Command::CheckDependencies => Event::DependenciesChecked(effects.check_dependencies().await),
        Command::InstallDependencies { distro, packages } => Event::DependenciesInstalled(
            effects.install_dependencies(&distro, &packages).await,
        ),
        Command::FetchCatalog => Event::CatalogFetched(effects.fetch_catalog().await),
        Command::ProbeInstall { root } => Event::InstallProbed(effects.probe_install(&root).await),
        Command::Download { url, dest } => Event::Downloaded(effects.download(&url, &dest).await),
        Command::Verify { archive, sha256 } => {
            Event::Verified(effects.verify(&archive, &sha256).await)
        }
        Command::RemoveInstall { root } => Event::Removed(effects.remove_install(&root).await),
        Command::Extract { archive, dest } => {
            Event::Extracted(effects.extract(&archive, &dest).await)
        }
        Command::Configure { bin_dir } => Event::Configured(effects.configure(&bin_dir).await),
        Command::AwaitInput(_) | Command::Wait | Command::Exit(_) => return None,
    };
    Some(event)
}

/// Effects against the real host.
#[derive(Clone)]
pub struct HostEffects {
    config: InstallerConfig,
    progress: ProgressCallback,
    home_dir: Option<PathBuf>,
    shell: Shell,
}

impl HostEffects {
    /// Creates host effects for `config`, reporting download progress to
    /// `progress`. Shell profiles are looked up in the user's home directory.
    #[must_use]
    pub fn new(config: InstallerConfig, progress: ProgressCallback) -> Self {
        Self {
            config,
            progress,
            home_dir: dirs::home_dir(),
            shell: Shell::detect(),
        }
    }

    /// Looks up shell profiles for `shell` under `home_dir` instead.
    #[must_use]
    pub fn with_profile_home(mut self, home_dir: impl Into<PathBuf>, shell: Shell) -> Self {
        self.home_dir = Some(home_dir.into());
        self.shell = shell;
        self
    }
}

impl std::fmt::Debug for HostEffects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostEffects")
            .field("config", &self.config)
            .field("home_dir", &self.home_dir)
            .field("shell", &self.shell)
            .finish_non_exhaustive()
    }
}

/// Runs blocking filesystem work off the async runtime.
async fn blocking<T, F>(what: &str, f: F) -> Result<T, InstallError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, InstallError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| InstallError::filesystem(format!("{what} task failed: {e}")))?
}

impl Effects for HostEffects {
    async fn check_dependencies(&self) -> Result<DependencyReport, InstallError> {
        deps::check().await
    }

    async fn install_dependencies(
        &self,
        distro: &DistroInfo,
        packages: &[String],
    ) -> Result<(), InstallError> {
        deps::install(distro, packages).await
    }

    async fn fetch_catalog(&self) -> Result<ReleaseCatalog, InstallError> {
        catalog::fetch(&self.config.catalog_url).await
    }

    async fn probe_install(&self, root: &Path) -> Result<bool, InstallError> {
        tokio::fs::try_exists(root)
            .await
            .map_err(|e| InstallError::io(format!("Failed to inspect {}", root.display()), &e))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<PathBuf, InstallError> {
        info!(%url, dest = %dest.display(), "downloading archive");
        download::download(url, dest, &self.progress).await?;
        Ok(dest.to_path_buf())
    }

    async fn verify(&self, archive: &Path, sha256: &str) -> Result<(), InstallError> {
        check_archive_dir(archive)?;
        let archive = archive.to_path_buf();
        let sha256 = sha256.to_string();
        blocking("checksum", move || verify::verify_checksum(&archive, &sha256)).await
    }

    async fn remove_install(&self, root: &Path) -> Result<(), InstallError> {
        match tokio::fs::remove_dir_all(root).await {
            Ok(()) => {
                info!(root = %root.display(), "removed previous installation");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(root = %root.display(), "no previous installation");
                Ok(())
            }
            Err(e) => Err(InstallError::io(
                format!("Failed to remove {}", root.display()),
                &e,
            )),
        }
    }

    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), InstallError> {
        // The archive is reopened by name; only a private directory keeps the
        // verified bytes from being swapped in between.
        check_archive_dir(archive)?;
        let archive = archive.to_path_buf();
        let dest = dest.to_path_buf();
        let to_remove = archive.clone();
        blocking("extraction", move || extract::extract_tar_gz(&archive, &dest)).await?;

        if let Err(e) = tokio::fs::remove_file(&to_remove).await {
            warn!(archive = %to_remove.display(), error = %e, "could not delete downloaded archive");
        }
        Ok(())
    }

    async fn configure(&self, bin_dir: &Path) -> PathSetup {
        let Some(home_dir) = self.home_dir.clone() else {
            return PathSetup::Failed {
                reason: "could not determine home directory".to_string(),
            };
        };
        let shell = self.shell;
        let bin_dir = bin_dir.to_path_buf();
        blocking("PATH setup", move || {
            Ok(shell::configure_path(&home_dir, shell, &bin_dir))
        })
        .await
        .unwrap_or_else(|e| PathSetup::Failed {
            reason: e.to_string(),
        })
    }
}

fn check_archive_dir(archive: &Path) -> Result<(), InstallError> {
    match archive.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => download::check_private_dir(dir),
        None => Ok(()),
    }
}
