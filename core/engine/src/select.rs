//! Build selection.
//!
//! Resolves a `(version, os, arch)` triple against a [`ReleaseCatalog`] to the
//! single archive that should be installed.

use crate::catalog::ReleaseCatalog;
use crate::error::InstallError;

/// Prefix every upstream version tag carries.
pub const VERSION_PREFIX: &str = "go";

/// The archive chosen for installation.
///
/// Filename and digest are always set together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSelection {
    /// Normalized version the archive belongs to.
    pub version: String,
    /// Upstream archive filename.
    pub filename: String,
    /// Published SHA-256 digest of the archive.
    pub sha256: String,
}

/// Prefixes a bare version with [`VERSION_PREFIX`].
///
/// `1.22.1` becomes `go1.22.1`; already prefixed and empty strings are
/// returned unchanged, so the function is idempotent.
#[must_use]
pub fn normalize_version(version: &str) -> String {
    let version = version.trim();
    if version.is_empty() || version.starts_with(VERSION_PREFIX) {
        version.to_string()
    } else {
        format!("{VERSION_PREFIX}{version}")
    }
}

/// Finds the archive for `version` on `os`/`arch`.
///
/// Releases and files are scanned in published order and the first match
/// wins.
///
/// # Errors
///
/// - [`InstallError::VersionNotFound`] if no release has that version
/// - [`InstallError::PlatformNotAvailable`] if the release exists but has no
///   `archive` entry for the platform
pub fn select(
    catalog: &ReleaseCatalog,
    version: &str,
    os: &str,
    arch: &str,
) -> Result<BuildSelection, InstallError> {
    let version = normalize_version(version);

    let release = catalog
        .releases()
        .iter()
        .find(|r| r.version == version)
        .ok_or_else(|| InstallError::version_not_found(&version))?;

    let file = release
        .files
        .iter()
        .find(|f| f.is_archive_for(os, arch))
        .ok_or_else(|| InstallError::platform_not_available(&version, os, arch))?;

    Ok(BuildSelection {
        version,
        filename: file.filename.clone(),
        sha256: file.sha256.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FileEntry, Release};

    fn file(name: &str, os: &str, arch: &str, kind: &str, sha: &str) -> FileEntry {
        FileEntry {
            filename: name.to_string(),
            os: os.to_string(),
            arch: arch.to_string(),
            kind: kind.to_string(),
            sha256: sha.to_string(),
            size: None,
        }
    }

    fn catalog() -> ReleaseCatalog {
        ReleaseCatalog::new(vec![
            Release {
                version: "go1.22.1".to_string(),
                stable: Some(true),
                files: vec![
                    file("go1.22.1.linux-amd64.msi", "linux", "amd64", "installer", "111"),
                    file("go1.22.1.linux-amd64.tar.gz", "linux", "amd64", "archive", "abc123"),
                    file("go1.22.1.linux-amd64-dup.tar.gz", "linux", "amd64", "archive", "dup"),
                    file("go1.22.1.darwin-arm64.tar.gz", "darwin", "arm64", "archive", "def456"),
                ],
            },
            Release {
                version: "go1.21.8".to_string(),
                stable: Some(true),
                files: vec![file("go1.21.8.src.tar.gz", "", "", "source", "999")],
            },
        ])
    }

    #[test]
    fn normalize_adds_prefix() {
        assert_eq!(normalize_version("1.22.1"), "go1.22.1");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_version("1.22.1");
        assert_eq!(normalize_version(&once), once);
        assert_eq!(normalize_version("go1.21rc2"), "go1.21rc2");
    }

    #[test]
    fn normalize_keeps_empty() {
        assert_eq!(normalize_version(""), "");
        assert_eq!(normalize_version("  "), "");
    }

    #[test]
    fn selects_first_archive_for_platform() {
        let sel = select(&catalog(), "1.22.1", "linux", "amd64").unwrap();
        assert_eq!(sel.version, "go1.22.1");
        assert_eq!(sel.filename, "go1.22.1.linux-amd64.tar.gz");
        assert_eq!(sel.sha256, "abc123");
    }

    #[test]
    fn accepts_prefixed_version() {
        let sel = select(&catalog(), "go1.22.1", "darwin", "arm64").unwrap();
        assert_eq!(sel.filename, "go1.22.1.darwin-arm64.tar.gz");
    }

    #[test]
    fn absent_version_is_version_not_found() {
        let err = select(&catalog(), "1.99.0", "linux", "amd64").unwrap_err();
        assert_eq!(err, InstallError::version_not_found("go1.99.0"));
    }

    #[test]
    fn missing_platform_is_platform_not_available() {
        let err = select(&catalog(), "1.22.1", "windows", "amd64").unwrap_err();
        assert_eq!(
            err,
            InstallError::platform_not_available("go1.22.1", "windows", "amd64")
        );
    }

    #[test]
    fn non_archive_kinds_are_never_selected() {
        let err = select(&catalog(), "1.21.8", "", "").unwrap_err();
        assert!(matches!(err, InstallError::PlatformNotAvailable { .. }));
    }
}
