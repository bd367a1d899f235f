//! Release catalog client.
//!
//! The catalog is the JSON document published at
//! `https://go.dev/dl/?mode=json&include=all`: an array of releases, newest
//! first, each listing the files built for it.
//!
//! ```json
//! [
//!   {
//!     "version": "go1.22.1",
//!     "stable": true,
//!     "files": [
//!       {
//!         "filename": "go1.22.1.linux-amd64.tar.gz",
//!         "os": "linux",
//!         "arch": "amd64",
//!         "version": "go1.22.1",
//!         "sha256": "aab8e15785c997ae20f9c88422ee35d962c4562212bb0f879d052a35c8307c7f",
//!         "size": 68965341,
//!         "kind": "archive"
//!       }
//!     ]
//!   }
//! ]
//! ```
//!
//! Fields not listed on [`Release`] and [`FileEntry`] are ignored.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::InstallError;

/// User-Agent header for HTTP requests.
pub(crate) const USER_AGENT: &str = concat!("go-install/", env!("CARGO_PKG_VERSION"));

/// `kind` value marking an installable archive.
pub const ARCHIVE_KIND: &str = "archive";

/// One downloadable file of a release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    /// Upstream filename, also the last path segment of the download URL.
    pub filename: String,
    /// Operating system the file targets. Empty for source tarballs.
    #[serde(default)]
    pub os: String,
    /// Architecture the file targets. Empty for source tarballs.
    #[serde(default)]
    pub arch: String,
    /// One of `archive`, `installer` or `source`.
    pub kind: String,
    /// Lowercase hex SHA-256 digest of the file.
    pub sha256: String,
    /// Size in bytes, when published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl FileEntry {
    /// Whether this entry is an installable archive for `os`/`arch`.
    #[must_use]
    pub fn is_archive_for(&self, os: &str, arch: &str) -> bool {
        self.kind == ARCHIVE_KIND && self.os == os && self.arch == arch
    }
}

/// A published toolchain version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Release {
    /// Version tag, e.g. `go1.22.1`.
    pub version: String,
    /// Whether upstream marks the release stable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable: Option<bool>,
    /// Files built for this version.
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

impl Release {
    /// Whether the release ships an archive for `os`/`arch`.
    #[must_use]
    pub fn has_archive_for(&self, os: &str, arch: &str) -> bool {
        self.files.iter().any(|f| f.is_archive_for(os, arch))
    }
}

/// The full list of releases in published order, latest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ReleaseCatalog {
    releases: Vec<Release>,
}

impl ReleaseCatalog {
    /// Wraps releases already in published order.
    #[must_use]
    pub fn new(releases: Vec<Release>) -> Self {
        Self { releases }
    }

    /// Parses a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Parse`] if the payload is not a JSON array of
    /// releases with the required fields.
    pub fn from_json(text: &str) -> Result<Self, InstallError> {
        serde_json::from_str(text).map_err(|e| InstallError::parse(e.to_string()))
    }

    /// Releases in published order.
    #[must_use]
    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    /// The first entry, which upstream publishes as the latest stable release.
    #[must_use]
    pub fn latest(&self) -> Option<&Release> {
        self.releases.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

/// Fetches and parses the release catalog.
///
/// Performs exactly one GET request. There is no retry and no request
/// timeout; a stalled server stalls the caller.
///
/// # Errors
///
/// - [`InstallError::Network`] if the request fails or the status is not 2xx
/// - [`InstallError::Parse`] if the body is not a valid catalog
pub async fn fetch(url: &str) -> Result<ReleaseCatalog, InstallError> {
    debug!(%url, "fetching release catalog");

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| InstallError::network(format!("Failed to create HTTP client: {e}")))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| InstallError::network(format!("Failed to fetch catalog from {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(InstallError::network(format!(
            "HTTP error {}: {url}",
            status.as_u16()
        )));
    }

    let text = response
        .text()
        .await
        .map_err(|e| InstallError::network(format!("Failed to read response from {url}: {e}")))?;

    let catalog = ReleaseCatalog::from_json(&text)?;
    debug!(releases = catalog.len(), "release catalog parsed");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "version": "go1.22.1",
            "stable": true,
            "files": [
                {"filename": "go1.22.1.src.tar.gz", "os": "", "arch": "", "version": "go1.22.1",
                 "sha256": "79c9b91d7f109515a25fc3ecdaad125d67e6bdb54f6d4d98580f46799caea321",
                 "size": 27563924, "kind": "source"},
                {"filename": "go1.22.1.linux-amd64.tar.gz", "os": "linux", "arch": "amd64",
                 "version": "go1.22.1",
                 "sha256": "aab8e15785c997ae20f9c88422ee35d962c4562212bb0f879d052a35c8307c7f",
                 "size": 68965341, "kind": "archive"}
            ]
        },
        {
            "version": "go1.21.8",
            "stable": true,
            "files": []
        }
    ]"#;

    #[test]
    fn parses_upstream_shape() {
        let catalog = ReleaseCatalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 2);
        let latest = catalog.latest().unwrap();
        assert_eq!(latest.version, "go1.22.1");
        assert_eq!(latest.stable, Some(true));
        assert_eq!(latest.files.len(), 2);
        assert_eq!(latest.files[1].size, Some(68_965_341));
    }

    #[test]
    fn ignores_unknown_fields() {
        let json = r#"[{"version": "go1.0", "extra": 1, "files": [
            {"filename": "a.tar.gz", "os": "linux", "arch": "amd64",
             "kind": "archive", "sha256": "00", "checksum_type": "sha256"}]}]"#;
        let catalog = ReleaseCatalog::from_json(json).unwrap();
        assert_eq!(catalog.releases()[0].files[0].filename, "a.tar.gz");
        assert_eq!(catalog.releases()[0].stable, None);
    }

    #[test]
    fn missing_required_field_is_parse_error() {
        let json = r#"[{"version": "go1.0", "files": [{"filename": "a.tar.gz"}]}]"#;
        let err = ReleaseCatalog::from_json(json).unwrap_err();
        assert!(matches!(err, InstallError::Parse { .. }));
    }

    #[test]
    fn non_array_payload_is_parse_error() {
        let err = ReleaseCatalog::from_json("<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, InstallError::Parse { .. }));
    }

    #[test]
    fn has_archive_for_skips_other_kinds() {
        let catalog = ReleaseCatalog::from_json(SAMPLE).unwrap();
        let latest = catalog.latest().unwrap();
        assert!(latest.has_archive_for("linux", "amd64"));
        assert!(!latest.has_archive_for("", ""));
        assert!(!catalog.releases()[1].has_archive_for("linux", "amd64"));
    }

    #[test]
    fn empty_catalog_has_no_latest() {
        let catalog = ReleaseCatalog::from_json("[]").unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.latest().is_none());
    }

    #[tokio::test]
    async fn fetch_reports_network_error_for_unreachable_host() {
        let err = fetch("http://127.0.0.1:1/catalog.json").await.unwrap_err();
        assert!(matches!(err, InstallError::Network { .. }));
    }
}
