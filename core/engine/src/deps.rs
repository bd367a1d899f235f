//! Host prerequisite detection and remediation.
//!
//! Building Go programs with cgo needs a C toolchain, and HTTPS downloads by
//! the installed toolchain need a CA bundle. This module checks a fixed list of
//! such prerequisites and, when asked, installs the missing ones through the
//! host package manager.
//!
//! ## Package manager priority
//!
//! Managers are probed in the order of [`PackageManager::PRIORITY`]; the first
//! executable found on `PATH` wins. For `apt-get` the distribution name comes
//! from `lsb_release -is`, falling back to `debian`.
//!
//! ## Remediation
//!
//! Installing runs the manager's update command first. Its exit status is
//! ignored because a stale package index is not a reason to stop. The install
//! command is then run once with the deduplicated package list, and only its
//! exit status decides success.

use std::fmt;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::InstallError;

/// Package managers the resolver knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    AptGet,
    Dnf,
    Yum,
    Pacman,
    Zypper,
    Apk,
    Brew,
}

impl PackageManager {
    /// Detection order. The first manager found on the host wins.
    pub const PRIORITY: [Self; 7] = [
        Self::AptGet,
        Self::Dnf,
        Self::Yum,
        Self::Pacman,
        Self::Zypper,
        Self::Apk,
        Self::Brew,
    ];

    /// Executable probed for on `PATH`.
    #[must_use]
    pub fn executable(self) -> &'static str {
        match self {
            Self::AptGet => "apt-get",
            Self::Dnf => "dnf",
            Self::Yum => "yum",
            Self::Pacman => "pacman",
            Self::Zypper => "zypper",
            Self::Apk => "apk",
            Self::Brew => "brew",
        }
    }

    /// Install command; package names are appended.
    #[must_use]
    pub fn install_template(self) -> &'static str {
        match self {
            Self::AptGet => "apt-get install -y",
            Self::Dnf => "dnf install -y",
            Self::Yum => "yum install -y",
            Self::Pacman => "pacman -S --noconfirm",
            Self::Zypper => "zypper --non-interactive install",
            Self::Apk => "apk add",
            Self::Brew => "brew install",
        }
    }

    /// Package index refresh command.
    #[must_use]
    pub fn update_template(self) -> &'static str {
        match self {
            Self::AptGet => "apt-get update",
            Self::Dnf => "dnf check-update",
            Self::Yum => "yum check-update",
            Self::Pacman => "pacman -Sy",
            Self::Zypper => "zypper --non-interactive refresh",
            Self::Apk => "apk update",
            Self::Brew => "brew update",
        }
    }

    /// Distribution family assumed when nothing more specific is known.
    #[must_use]
    pub fn default_distro(self) -> &'static str {
        match self {
            Self::AptGet => "debian",
            Self::Dnf => "fedora",
            Self::Yum => "rhel",
            Self::Pacman => "arch",
            Self::Zypper => "opensuse",
            Self::Apk => "alpine",
            Self::Brew => "macos",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable())
    }
}

/// The host's distribution and how to install packages on it.
///
/// Resolved once per session and reused for both checking and remediation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistroInfo {
    /// Distribution name used to look up package names, e.g. `ubuntu`.
    pub name: String,
    /// Detected package manager.
    pub manager: PackageManager,
    /// Install command template.
    pub install_command: String,
    /// Update command template.
    pub update_command: String,
}

impl DistroInfo {
    /// Describes a host using `manager`, under distribution `name`.
    #[must_use]
    pub fn new(manager: PackageManager, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manager,
            install_command: manager.install_template().to_string(),
            update_command: manager.update_template().to_string(),
        }
    }

    /// Detects the distribution of the running host.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Dependency`] if none of the known package
    /// managers is installed.
    pub async fn detect() -> Result<Self, InstallError> {
        let Some(manager) = detect_manager(|exe| which::which(exe).is_ok()) else {
            return Err(InstallError::dependency("unable to detect package manager"));
        };

        let name = if manager == PackageManager::AptGet {
            lsb_release_id().await
        } else {
            None
        };

        let distro = Self::new(
            manager,
            name.unwrap_or_else(|| manager.default_distro().to_string()),
        );
        debug!(distro = %distro.name, manager = %distro.manager, "detected package manager");
        Ok(distro)
    }
}

/// Returns the first manager in [`PackageManager::PRIORITY`] accepted by `is_installed`.
pub fn detect_manager(is_installed: impl Fn(&str) -> bool) -> Option<PackageManager> {
    PackageManager::PRIORITY
        .into_iter()
        .find(|m| is_installed(m.executable()))
}

async fn lsb_release_id() -> Option<String> {
    let output = Command::new("lsb_release")
        .arg("-is")
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;
    let id = String::from_utf8_lossy(&output.stdout).trim().to_lowercase();
    (!id.is_empty()).then_some(id)
}

/// How to tell whether a prerequisite is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Present if any of these files exists.
    AnyFileExists(&'static [&'static str]),
    /// Present if the command exits with status zero.
    CommandSucceeds(&'static str, &'static [&'static str]),
}

impl Probe {
    /// Runs the probe against the host.
    pub async fn is_satisfied(self) -> bool {
        match self {
            Self::AnyFileExists(paths) => any_file_exists(paths).await,
            Self::CommandSucceeds(program, args) => Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .is_ok_and(|status| status.success()),
        }
    }
}

async fn any_file_exists<P: AsRef<Path>>(paths: &[P]) -> bool {
    for path in paths {
        if tokio::fs::try_exists(path.as_ref()).await.unwrap_or(false) {
            return true;
        }
    }
    false
}

/// A host prerequisite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    /// Human-readable name.
    pub name: &'static str,
    /// Presence check.
    pub probe: Probe,
    /// Package names per distribution. A value may name several packages
    /// separated by whitespace.
    pub packages: &'static [(&'static str, &'static str)],
    /// Whether installation should be blocked when this is missing.
    pub required: bool,
}

impl Dependency {
    /// Package names for `distro`, split on whitespace.
    ///
    /// Falls back to the manager's default distribution when `distro.name` has
    /// no entry, so derivatives such as `linuxmint` resolve like `debian`.
    #[must_use]
    pub fn packages_for(&self, distro: &DistroInfo) -> Vec<String> {
        let lookup = |name: &str| {
            self.packages
                .iter()
                .find(|(d, _)| *d == name)
                .map(|(_, pkgs)| *pkgs)
        };
        lookup(&distro.name)
            .or_else(|| lookup(distro.manager.default_distro()))
            .map(|pkgs| pkgs.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// CA bundle locations across distributions.
const CA_BUNDLES: &[&str] = &[
    "/etc/ssl/certs/ca-certificates.crt",
    "/etc/pki/tls/certs/ca-bundle.crt",
    "/etc/ssl/cert.pem",
];

/// Prerequisites checked before installing.
pub static DEPENDENCIES: &[Dependency] = &[
    Dependency {
        name: "CA Certificates",
        probe: Probe::AnyFileExists(CA_BUNDLES),
        packages: &[
            ("debian", "ca-certificates"),
            ("ubuntu", "ca-certificates"),
            ("fedora", "ca-certificates"),
            ("rhel", "ca-certificates"),
            ("arch", "ca-certificates"),
            ("opensuse", "ca-certificates"),
            ("alpine", "ca-certificates"),
            ("macos", "ca-certificates"),
        ],
        required: true,
    },
    Dependency {
        name: "GCC",
        probe: Probe::CommandSucceeds("gcc", &["--version"]),
        packages: &[
            ("debian", "build-essential"),
            ("ubuntu", "build-essential"),
            ("fedora", "gcc gcc-c++ make"),
            ("rhel", "gcc gcc-c++ make"),
            ("arch", "base-devel"),
            ("opensuse", "gcc gcc-c++ make"),
            ("alpine", "build-base"),
            ("macos", "gcc"),
        ],
        required: true,
    },
    Dependency {
        name: "Make",
        probe: Probe::CommandSucceeds("make", &["--version"]),
        packages: &[
            ("debian", "build-essential"),
            ("ubuntu", "build-essential"),
            ("fedora", "make"),
            ("rhel", "make"),
            ("arch", "base-devel"),
            ("opensuse", "make"),
            ("alpine", "build-base"),
            ("macos", "make"),
        ],
        required: true,
    },
    Dependency {
        name: "Git",
        probe: Probe::CommandSucceeds("git", &["--version"]),
        packages: &[
            ("debian", "git"),
            ("ubuntu", "git"),
            ("fedora", "git"),
            ("rhel", "git"),
            ("arch", "git"),
            ("opensuse", "git"),
            ("alpine", "git"),
            ("macos", "git"),
        ],
        required: false,
    },
];

/// A prerequisite found missing on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDependency {
    pub name: String,
    pub required: bool,
    /// Packages that provide it on the detected distribution.
    pub packages: Vec<String>,
}

/// Outcome of a dependency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyReport {
    /// The detected distribution.
    pub distro: DistroInfo,
    /// Missing prerequisites, in declaration order.
    pub missing: Vec<MissingDependency>,
}

impl DependencyReport {
    /// True when nothing is missing.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        self.missing.is_empty()
    }

    /// Union of the missing prerequisites' packages, deduplicated in
    /// first-seen order.
    #[must_use]
    pub fn packages(&self) -> Vec<String> {
        let mut packages: Vec<String> = Vec::new();
        for pkg in self.missing.iter().flat_map(|m| &m.packages) {
            if !packages.contains(pkg) {
                packages.push(pkg.clone());
            }
        }
        packages
    }

    /// The command shown to the user before remediation.
    #[must_use]
    pub fn remediation_command(&self) -> String {
        format_command(&self.distro.install_command, &self.packages())
    }
}

/// Renders `template` with `packages` appended, prefixed with `sudo` for display.
#[must_use]
pub fn format_command(template: &str, packages: &[String]) -> String {
    let mut command = format!("sudo {template}");
    for pkg in packages {
        command.push(' ');
        command.push_str(pkg);
    }
    command
}

/// Checks every entry of [`DEPENDENCIES`] on the host.
///
/// # Errors
///
/// Returns [`InstallError::Dependency`] if no package manager can be
/// detected, since nothing could be remediated.
pub async fn check() -> Result<DependencyReport, InstallError> {
    let distro = DistroInfo::detect().await?;
    let mut missing = Vec::new();
    for dep in DEPENDENCIES {
        if dep.probe.is_satisfied().await {
            debug!(dependency = dep.name, "present");
        } else {
            info!(dependency = dep.name, required = dep.required, "missing");
            missing.push(MissingDependency {
                name: dep.name.to_string(),
                required: dep.required,
                packages: dep.packages_for(&distro),
            });
        }
    }
    Ok(DependencyReport { distro, missing })
}

/// Installs `packages` through the distribution's package manager.
///
/// # Errors
///
/// Returns [`InstallError::Dependency`] if there is nothing to install with,
/// the install command cannot be spawned, or it exits non-zero.
pub async fn install(distro: &DistroInfo, packages: &[String]) -> Result<(), InstallError> {
    if packages.is_empty() {
        return Err(InstallError::dependency(format!(
            "no packages known for the missing dependencies on {}",
            distro.name
        )));
    }

    if let Err(e) = run(&distro.update_command, &[]).await {
        warn!(command = %distro.update_command, error = %e, "package index refresh failed, continuing");
    }

    info!(command = %distro.install_command, ?packages, "installing dependencies");
    run(&distro.install_command, packages)
        .await
        .map_err(|e| InstallError::dependency(format!("failed to install packages: {e}")))
}

/// Runs a command template with extra arguments, capturing output.
async fn run(template: &str, extra: &[String]) -> Result<(), String> {
    let mut parts = template.split_whitespace();
    let Some(program) = parts.next() else {
        return Err("empty command".to_string());
    };

    let output = Command::new(program)
        .args(parts)
        .args(extra)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| format!("{program}: {e}"))?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
    match output.status.code() {
        Some(code) if detail.is_empty() => Err(format!("{program} exited with code {code}")),
        Some(code) => Err(format!("{program} exited with code {code}: {}", detail.trim())),
        None => Err(format!("{program} was terminated by a signal")),
    }
}
