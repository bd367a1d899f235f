//! Version picker model shared by both frontends.

use goinst_engine::catalog::ReleaseCatalog;
use goinst_engine::platform::Target;

/// One row of the version picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChoice {
    pub version: String,
    /// "Latest stable release" for the first catalog entry, "Go release" otherwise.
    pub label: &'static str,
    pub stable: Option<bool>,
    /// Whether the release has an archive for the host. Rows without one are
    /// shown but cannot be picked.
    pub available: bool,
}

impl VersionChoice {
    /// Label with the stability marker appended when the catalog has one.
    #[must_use]
    pub fn description(&self) -> String {
        match self.stable {
            Some(true) => format!("{} (stable)", self.label),
            Some(false) => format!("{} (unstable)", self.label),
            None => self.label.to_string(),
        }
    }
}

/// Builds the picker rows for `catalog` in catalog order.
#[must_use]
pub fn choices(catalog: &ReleaseCatalog, target: &Target) -> Vec<VersionChoice> {
    catalog
        .releases()
        .iter()
        .enumerate()
        .map(|(index, release)| VersionChoice {
            version: release.version.clone(),
            label: if index == 0 {
                "Latest stable release"
            } else {
                "Go release"
            },
            stable: release.stable,
            available: release.has_archive_for(&target.os, &target.arch),
        })
        .collect()
}

/// Indices of the rows whose version contains `filter`, case-insensitively.
#[must_use]
pub fn filter_indices(choices: &[VersionChoice], filter: &str) -> Vec<usize> {
    let needle = filter.trim().to_lowercase();
    choices
        .iter()
        .enumerate()
        .filter(|(_, c)| needle.is_empty() || c.version.to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ReleaseCatalog {
        ReleaseCatalog::from_json(
            r#"[
                {"version": "go1.22.1", "stable": true, "files": [
                    {"filename": "go1.22.1.linux-amd64.tar.gz", "os": "linux", "arch": "amd64", "kind": "archive", "sha256": "aa"}
                ]},
                {"version": "go1.23rc1", "stable": false, "files": [
                    {"filename": "go1.23rc1.darwin-arm64.tar.gz", "os": "darwin", "arch": "arm64", "kind": "archive", "sha256": "bb"}
                ]},
                {"version": "go1.21.8", "files": [
                    {"filename": "go1.21.8.linux-amd64.tar.gz", "os": "linux", "arch": "amd64", "kind": "archive", "sha256": "cc"}
                ]}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn first_entry_is_latest_stable() {
        let rows = choices(&catalog(), &Target::new("linux", "amd64"));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].label, "Latest stable release");
        assert_eq!(rows[1].label, "Go release");
        assert_eq!(rows[0].description(), "Latest stable release (stable)");
        assert_eq!(rows[1].description(), "Go release (unstable)");
        assert_eq!(rows[2].description(), "Go release");
    }

    #[test]
    fn rows_without_host_archive_are_unavailable() {
        let rows = choices(&catalog(), &Target::new("linux", "amd64"));
        assert!(rows[0].available);
        assert!(!rows[1].available);
        assert!(rows[2].available);
    }

    #[test]
    fn filter_matches_substring_case_insensitively() {
        let rows = choices(&catalog(), &Target::new("linux", "amd64"));
        assert_eq!(filter_indices(&rows, ""), vec![0, 1, 2]);
        assert_eq!(filter_indices(&rows, "1.2"), vec![0, 1, 2]);
        assert_eq!(filter_indices(&rows, "RC"), vec![1]);
        assert_eq!(filter_indices(&rows, "1.21"), vec![2]);
        assert!(filter_indices(&rows, "1.99").is_empty());
    }
}
