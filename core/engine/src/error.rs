//! Error types for the installation engine.
//!
//! Every asynchronous step of a session reports its failure as an
//! [`InstallError`]. Variants carry owned strings rather than boxed sources
//! so that an outcome can be cloned, moved across threads and stored inside
//! an [`Event`](crate::event::Event) without lifetimes leaking out of the
//! worker that produced it.

use thiserror::Error;

/// Closed set of failures a session can end with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    /// Transport failure or non-success HTTP status.
    #[error("network error: {message}")]
    Network {
        /// Description of the failed request.
        message: String,
    },

    /// The release catalog could not be decoded.
    #[error("could not parse release catalog: {message}")]
    Parse {
        /// Description of the decoding failure.
        message: String,
    },

    /// The requested version is not published at all.
    #[error("version {version} not found")]
    VersionNotFound {
        /// Normalized version that was requested.
        version: String,
    },

    /// The version exists but ships no archive for the target platform.
    #[error("version {version} exists but no archive for {os}/{arch}")]
    PlatformNotAvailable {
        /// Normalized version that was requested.
        version: String,
        /// Target operating system in catalog naming.
        os: String,
        /// Target architecture in catalog naming.
        arch: String,
    },

    /// The downloaded archive does not hash to the published digest.
    #[error("integrity check failed: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Digest declared by the catalog.
        expected: String,
        /// Digest computed from the downloaded bytes.
        actual: String,
    },

    /// Removing, extracting or writing files failed.
    #[error("filesystem error: {message}")]
    Filesystem {
        /// Description of the failed operation.
        message: String,
    },

    /// Host prerequisites could not be detected or installed.
    #[error("dependency error: {message}")]
    Dependency {
        /// Description of the failure.
        message: String,
    },

    /// The user answered "no" at a confirmation point.
    #[error("{message}")]
    UserDeclined {
        /// What was declined.
        message: String,
    },

    /// The process lacks the privileges needed to install.
    #[error("{message}")]
    Privilege {
        /// Instructions for the user.
        message: String,
    },
}

impl InstallError {
    /// Creates a new `Network` error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a new `Parse` error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates a new `VersionNotFound` error.
    #[must_use]
    pub fn version_not_found(version: impl Into<String>) -> Self {
        Self::VersionNotFound {
            version: version.into(),
        }
    }

    /// Creates a new `PlatformNotAvailable` error.
    #[must_use]
    pub fn platform_not_available(
        version: impl Into<String>,
        os: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self::PlatformNotAvailable {
            version: version.into(),
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Creates a new `ChecksumMismatch` error.
    #[must_use]
    pub fn checksum_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ChecksumMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a new `Filesystem` error.
    #[must_use]
    pub fn filesystem(message: impl Into<String>) -> Self {
        Self::Filesystem {
            message: message.into(),
        }
    }

    /// Creates a `Filesystem` error from an I/O error with context.
    #[must_use]
    pub fn io(context: impl AsRef<str>, source: &std::io::Error) -> Self {
        Self::Filesystem {
            message: format!("{}: {source}", context.as_ref()),
        }
    }

    /// Creates a new `Dependency` error.
    #[must_use]
    pub fn dependency(message: impl Into<String>) -> Self {
        Self::Dependency {
            message: message.into(),
        }
    }

    /// Creates a new `UserDeclined` error.
    #[must_use]
    pub fn user_declined(message: impl Into<String>) -> Self {
        Self::UserDeclined {
            message: message.into(),
        }
    }

    /// Creates the `Privilege` error shown when not running as root.
    #[must_use]
    pub fn privilege() -> Self {
        Self::Privilege {
            message: "This tool requires root privileges. Please run with sudo.".to_string(),
        }
    }

    /// Short category label used in logs and the failure screen.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Parse { .. } => "parse",
            Self::VersionNotFound { .. } => "version-not-found",
            Self::PlatformNotAvailable { .. } => "platform-not-available",
            Self::ChecksumMismatch { .. } => "checksum-mismatch",
            Self::Filesystem { .. } => "filesystem",
            Self::Dependency { .. } => "dependency",
            Self::UserDeclined { .. } => "declined",
            Self::Privilege { .. } => "privilege",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_not_found_display() {
        let err = InstallError::version_not_found("go9.9.9");
        assert_eq!(err.to_string(), "version go9.9.9 not found");
    }

    #[test]
    fn platform_not_available_display() {
        let err = InstallError::platform_not_available("go1.22.1", "plan9", "mips");
        assert_eq!(
            err.to_string(),
            "version go1.22.1 exists but no archive for plan9/mips"
        );
    }

    #[test]
    fn checksum_mismatch_display() {
        let err = InstallError::checksum_mismatch("abc", "def");
        let msg = err.to_string();
        assert!(msg.contains("integrity check failed"));
        assert!(msg.contains("expected abc"));
        assert!(msg.contains("got def"));
    }

    #[test]
    fn io_error_includes_context_and_source() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = InstallError::io("Failed to remove /usr/local/go", &source);
        assert!(matches!(err, InstallError::Filesystem { .. }));
        assert_eq!(
            err.to_string(),
            "filesystem error: Failed to remove /usr/local/go: denied"
        );
    }

    #[test]
    fn privilege_message_mentions_sudo() {
        let err = InstallError::privilege();
        assert!(err.to_string().contains("sudo"));
        assert_eq!(err.kind(), "privilege");
    }

    #[test]
    fn user_declined_displays_message_verbatim() {
        let err = InstallError::user_declined("dependencies are required for Go installation");
        assert_eq!(
            err.to_string(),
            "dependencies are required for Go installation"
        );
    }

    #[test]
    fn errors_are_cloneable_and_comparable() {
        let err = InstallError::network("connection refused");
        assert_eq!(err.clone(), err);
    }
}
