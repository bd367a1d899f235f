//! Shell configuration for PATH setup.
//!
//! After the toolchain is unpacked its `bin` directory is appended to `PATH`
//! by adding an export line to a shell startup file. Candidates depend on the
//! user's login shell:
//!
//! - Zsh: `~/.zshrc`
//! - Bash: `~/.bashrc`, then `~/.bash_profile`
//! - Fish: `~/.config/fish/config.fish`
//! - anything else: `~/.profile`, then `~/.bashrc`
//!
//! Only files that already exist are considered; none are created. Files are
//! appended to, never rewritten.
//!
//! ## Configuration Format
//!
//! For POSIX shells:
//! ```bash
//! # Added by go-install
//! export PATH="$PATH:/usr/local/go/bin"
//! ```
//!
//! For fish:
//! ```fish
//! # Added by go-install
//! fish_add_path --append /usr/local/go/bin
//! ```

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Marker comment written above the export line.
pub const MARKER: &str = "# Added by go-install";

/// Shell families with distinct startup files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    /// Any other or unknown shell.
    Posix,
}

impl Shell {
    /// Detects the user's shell from the `SHELL` environment variable.
    #[must_use]
    pub fn detect() -> Self {
        std::env::var("SHELL")
            .map(|path| Self::from_path(&path))
            .unwrap_or(Self::Posix)
    }

    /// Parses a shell from a path string (e.g., "/bin/bash").
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        match Path::new(path).file_name().and_then(|n| n.to_str()) {
            Some("bash") => Self::Bash,
            Some("zsh") => Self::Zsh,
            Some("fish") => Self::Fish,
            _ => Self::Posix,
        }
    }

    /// Returns the startup files to try, in priority order.
    #[must_use]
    pub fn profile_candidates(self, home_dir: &Path) -> Vec<PathBuf> {
        match self {
            Self::Bash => vec![home_dir.join(".bashrc"), home_dir.join(".bash_profile")],
            Self::Zsh => vec![home_dir.join(".zshrc")],
            Self::Fish => vec![home_dir.join(".config").join("fish").join("config.fish")],
            Self::Posix => vec![home_dir.join(".profile"), home_dir.join(".bashrc")],
        }
    }

    /// Generates the PATH configuration snippet for this shell.
    #[must_use]
    pub fn path_config(self, bin_path: &Path) -> String {
        let path = self.quoted_path(bin_path);
        match self {
            Self::Bash | Self::Zsh | Self::Posix => {
                format!("\n{MARKER}\nexport PATH=\"$PATH:{path}\"\n")
            }
            Self::Fish => format!("\n{MARKER}\nfish_add_path --append {path}\n"),
        }
    }

    /// How `bin_path` is spelled inside [`Self::path_config`].
    ///
    /// For POSIX shells `$`, backticks, `"` and `\` are escaped for use inside
    /// double quotes. For fish the path is single-quoted when it contains
    /// whitespace or shell metacharacters.
    fn quoted_path(self, bin_path: &Path) -> String {
        let path_str = bin_path.display().to_string();
        match self {
            Self::Bash | Self::Zsh | Self::Posix => path_str
                .replace('\\', "\\\\")
                .replace('$', "\\$")
                .replace('`', "\\`")
                .replace('"', "\\\""),
            Self::Fish => {
                let needs_quotes = path_str.chars().any(|c| {
                    c.is_whitespace()
                        || matches!(
                            c,
                            '$' | '\\' | '\'' | '*' | '?' | '(' | ')' | '[' | ']' | '{' | '}'
                        )
                });
                if needs_quotes {
                    format!("'{}'", path_str.replace('\'', "\\'"))
                } else {
                    path_str
                }
            }
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bash => "bash",
            Self::Zsh => "zsh",
            Self::Fish => "fish",
            Self::Posix => "sh",
        };
        f.write_str(name)
    }
}

/// Result of configuring PATH.
///
/// `Failed` is not an error: the toolchain is installed and usable once the
/// user adds the directory to `PATH` by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSetup {
    /// The export line was appended to `profile`.
    Added { profile: PathBuf },
    /// `profile` already mentions the binary directory.
    AlreadyConfigured { profile: PathBuf },
    /// No candidate file exists or none could be written.
    Failed { reason: String },
}

impl PathSetup {
    /// Whether PATH is set up after this step.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Configures PATH in `shell`'s startup files under `home_dir`.
#[must_use]
pub fn configure_path(home_dir: &Path, shell: Shell, bin_path: &Path) -> PathSetup {
    debug!(%shell, home = %home_dir.display(), "configuring PATH");
    configure_path_in(&shell.profile_candidates(home_dir), shell, bin_path)
}

/// Configures PATH using an explicit candidate list.
///
/// Walks `candidates` in order, skipping files that do not exist. The first
/// existing file that already mentions `bin_path`, either as written or in the
/// escaped form the snippet uses, ends the walk as
/// [`PathSetup::AlreadyConfigured`]; otherwise the first file the snippet can
/// be appended to ends it as [`PathSetup::Added`]. Unreadable or unwritable
/// files are skipped.
#[must_use]
pub fn configure_path_in(candidates: &[PathBuf], shell: Shell, bin_path: &Path) -> PathSetup {
    let needles = [bin_path.display().to_string(), shell.quoted_path(bin_path)];

    for profile in candidates.iter().filter(|p| p.is_file()) {
        match std::fs::read_to_string(profile) {
            Ok(content) if needles.iter().any(|n| content.contains(n.as_str())) => {
                return PathSetup::AlreadyConfigured {
                    profile: profile.clone(),
                };
            }
            Ok(_) => {}
            Err(e) => {
                warn!(profile = %profile.display(), error = %e, "cannot read shell profile");
                continue;
            }
        }

        match append_to_file(profile, &shell.path_config(bin_path)) {
            Ok(()) => {
                return PathSetup::Added {
                    profile: profile.clone(),
                };
            }
            Err(e) => {
                warn!(profile = %profile.display(), error = %e, "cannot write shell profile");
            }
        }
    }

    PathSetup::Failed {
        reason: "could not find shell config file to update".to_string(),
    }
}

fn append_to_file(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new().append(true).open(path)?;
    file.write_all(content.as_bytes())
}

/// Returns the manual PATH instruction shown when configuration failed.
#[must_use]
pub fn manual_path_instruction(bin_path: &Path) -> String {
    format!("export PATH=\"$PATH:{}\"", bin_path.display())
}

/// Returns the command that reloads `profile` in the current shell.
#[must_use]
pub fn source_command(profile: &Path) -> String {
    format!("source {}", profile.display())
}
