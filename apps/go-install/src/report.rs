//! Final session summary and exit codes.

use goinst_engine::SessionOutcome;
use goinst_engine::shell::{self, PathSetup};

/// Exit code for a session the user cancelled (128 + SIGINT).
pub const EXIT_CANCELLED: i32 = 130;

/// How a summary should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Error,
}

/// Text shown once the session has ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub tone: Tone,
    pub headline: String,
    pub details: Vec<String>,
}

/// Maps an outcome to the process exit code.
#[must_use]
pub fn exit_code(outcome: &SessionOutcome) -> i32 {
    match outcome {
        SessionOutcome::Installed(_) => 0,
        SessionOutcome::Failed(_) => 1,
        SessionOutcome::Cancelled => EXIT_CANCELLED,
    }
}

#[must_use]
pub fn summarize(outcome: &SessionOutcome) -> Summary {
    match outcome {
        SessionOutcome::Installed(report) => {
            let headline = format!(
                "Successfully installed {} to {}",
                report.version,
                report.install_root.display()
            );
            let tone = if report.path_setup.is_configured() {
                Tone::Success
            } else {
                Tone::Warning
            };
            let details = match &report.path_setup {
                PathSetup::Added { profile } => vec![
                    format!(
                        "Added {} to PATH in {}",
                        report.bin_dir.display(),
                        profile.display()
                    ),
                    format!(
                        "Restart your terminal or run: {}",
                        shell::source_command(profile)
                    ),
                ],
                PathSetup::AlreadyConfigured { profile } => vec![format!(
                    "{} is already on PATH via {}",
                    report.bin_dir.display(),
                    profile.display()
                )],
                PathSetup::Failed { reason } => vec![
                    format!("Could not update PATH automatically: {reason}"),
                    "Add this line to your shell profile:".to_string(),
                    format!("  {}", shell::manual_path_instruction(&report.bin_dir)),
                ],
            };
            Summary {
                tone,
                headline,
                details,
            }
        }
        SessionOutcome::Failed(e) => Summary {
            tone: Tone::Error,
            headline: format!("Error: {e}"),
            details: Vec::new(),
        },
        SessionOutcome::Cancelled => Summary {
            tone: Tone::Warning,
            headline: "Installation cancelled.".to_string(),
            details: Vec::new(),
        },
    }
}

/// Prints the summary, to stdout on success and stderr otherwise.
pub fn print(outcome: &SessionOutcome) {
    let summary = summarize(outcome);
    if matches!(outcome, SessionOutcome::Installed(_)) {
        println!("{}", summary.headline);
        for line in &summary.details {
            println!("{line}");
        }
    } else {
        eprintln!("{}", summary.headline);
        for line in &summary.details {
            eprintln!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goinst_engine::{InstallError, InstallReport};
    use std::path::PathBuf;

    fn installed(path_setup: PathSetup) -> SessionOutcome {
        SessionOutcome::Installed(InstallReport {
            version: "go1.22.1".to_string(),
            install_root: PathBuf::from("/usr/local/go"),
            bin_dir: PathBuf::from("/usr/local/go/bin"),
            path_setup,
        })
    }

    #[test]
    fn exit_codes() {
        assert_eq!(exit_code(&installed(PathSetup::Failed { reason: String::new() })), 0);
        assert_eq!(
            exit_code(&SessionOutcome::Failed(InstallError::network("down"))),
            1
        );
        assert_eq!(exit_code(&SessionOutcome::Cancelled), 130);
    }

    #[test]
    fn success_mentions_version_root_and_source_hint() {
        let summary = summarize(&installed(PathSetup::Added {
            profile: PathBuf::from("/root/.bashrc"),
        }));
        assert_eq!(summary.tone, Tone::Success);
        assert_eq!(
            summary.headline,
            "Successfully installed go1.22.1 to /usr/local/go"
        );
        assert!(summary.details[1].ends_with("source /root/.bashrc"));
    }

    #[test]
    fn path_failure_shows_manual_export() {
        let summary = summarize(&installed(PathSetup::Failed {
            reason: "could not find shell config file to update".to_string(),
        }));
        assert_eq!(summary.tone, Tone::Warning);
        assert!(
            summary
                .details
                .iter()
                .any(|l| l.contains("export PATH=\"$PATH:/usr/local/go/bin\""))
        );
    }

    #[test]
    fn failure_shows_error_message() {
        let summary = summarize(&SessionOutcome::Failed(InstallError::checksum_mismatch(
            "aa", "bb",
        )));
        assert_eq!(summary.tone, Tone::Error);
        assert!(summary.headline.contains("integrity check failed"));
    }
}
