//! Installer configuration.
//!
//! Endpoints and filesystem locations are resolved once at startup from
//! environment variables. Empty or whitespace-only values are treated as
//! unset so that `VAR=` in a shell does not produce an empty URL or path.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::error::InstallError;
use crate::platform::Target;

/// Environment variable overriding the release catalog URL.
pub const CATALOG_URL_ENV: &str = "GO_INSTALL_CATALOG_URL";

/// Environment variable overriding the archive download base URL.
pub const DIST_SERVER_ENV: &str = "GO_INSTALL_DIST_SERVER";

/// Environment variable overriding the directory the toolchain is unpacked into.
pub const PREFIX_ENV: &str = "GO_INSTALL_PREFIX";

/// Environment variable overriding where archives are downloaded.
pub const DOWNLOAD_DIR_ENV: &str = "GO_INSTALL_DOWNLOAD_DIR";

const DEFAULT_CATALOG_URL: &str = "https://go.dev/dl/?mode=json&include=all";
const DEFAULT_DIST_SERVER: &str = "https://go.dev/dl/";
const DEFAULT_PREFIX: &str = "/usr/local";

/// Name of the directory the upstream archives unpack to.
const INSTALL_DIR_NAME: &str = "go";

/// Everything a session needs to know about where things live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerConfig {
    /// URL of the JSON release catalog.
    pub catalog_url: String,
    /// Base URL archives are fetched from; the filename is appended.
    pub dist_server: String,
    /// Parent directory of the install root.
    pub prefix: PathBuf,
    /// Directory downloaded archives are written to.
    pub download_dir: PathBuf,
    /// Platform archives are selected for.
    pub target: Target,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            dist_server: DEFAULT_DIST_SERVER.to_string(),
            prefix: PathBuf::from(DEFAULT_PREFIX),
            download_dir: std::env::temp_dir().join("go-install"),
            target: Target::host(),
        }
    }
}

impl InstallerConfig {
    /// Builds the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            catalog_url: env_non_empty(CATALOG_URL_ENV).unwrap_or(defaults.catalog_url),
            dist_server: env_non_empty(DIST_SERVER_ENV).unwrap_or(defaults.dist_server),
            prefix: env_non_empty(PREFIX_ENV).map_or(defaults.prefix, PathBuf::from),
            download_dir: env_non_empty(DOWNLOAD_DIR_ENV)
                .map_or(defaults.download_dir, PathBuf::from),
            target: defaults.target,
        }
    }

    /// Points `download_dir` at a fresh private directory for this session,
    /// unless [`DOWNLOAD_DIR_ENV`] chose one.
    ///
    /// The directory is created with mode `0700` and removed when the returned
    /// guard is dropped, so keep the guard alive until the session ends.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Filesystem`] if the directory cannot be created.
    pub fn stage_downloads(&mut self) -> Result<Option<TempDir>, InstallError> {
        if env_non_empty(DOWNLOAD_DIR_ENV).is_some() {
            return Ok(None);
        }
        let staging = tempfile::Builder::new()
            .prefix("go-install-")
            .tempdir()
            .map_err(|e| InstallError::io("Failed to create download directory", &e))?;
        self.download_dir = staging.path().to_path_buf();
        Ok(Some(staging))
    }

    /// The canonical install directory, `<prefix>/go`.
    #[must_use]
    pub fn install_root(&self) -> PathBuf {
        self.prefix.join(INSTALL_DIR_NAME)
    }

    /// The toolchain binary directory added to `PATH`.
    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.install_root().join("bin")
    }

    /// Full download URL for an archive filename.
    #[must_use]
    pub fn archive_url(&self, filename: &str) -> String {
        format!("{}/{filename}", self.dist_server.trim().trim_end_matches('/'))
    }

    /// Local path the archive is downloaded to.
    #[must_use]
    pub fn archive_path(&self, filename: &str) -> PathBuf {
        self.download_dir.join(filename)
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
