//! Archive extraction.
//!
//! Upstream archives are gzip-compressed tarballs whose entries all live under
//! a top-level `go/` directory, so they are unpacked into the install root's
//! parent. Entries keep the directory layout, permission bits and symbolic
//! links recorded in the archive.
//!
//! Extraction is not transactional. A failure partway through leaves whatever
//! was already written on disk.

use std::path::{Component, Path};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::debug;

use crate::error::InstallError;

/// Extracts a `.tar.gz` archive into `dest_dir`.
///
/// Creates `dest_dir` if it does not exist.
///
/// # Errors
///
/// Returns [`InstallError::Filesystem`] if:
/// - the file name does not end in `.tar.gz` or `.tgz`
/// - the archive cannot be opened or is not a valid gzip tarball
/// - an entry has an absolute path or a `..` component
/// - directory or file creation fails
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<(), InstallError> {
    if !is_tar_gz(archive_path) {
        return Err(InstallError::filesystem(format!(
            "Unsupported archive format: {}",
            archive_path.display()
        )));
    }

    std::fs::create_dir_all(dest_dir).map_err(|e| {
        InstallError::io(format!("Failed to create directory {}", dest_dir.display()), &e)
    })?;

    let file = std::fs::File::open(archive_path).map_err(|e| {
        InstallError::io(format!("Failed to open archive {}", archive_path.display()), &e)
    })?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.set_preserve_permissions(true);
    archive.set_preserve_mtime(true);
    archive.set_overwrite(true);

    let entries = archive.entries().map_err(|e| {
        InstallError::io(format!("Failed to read tar entries {}", archive_path.display()), &e)
    })?;

    let mut count = 0usize;
    for entry in entries {
        let mut entry = entry.map_err(|e| {
            InstallError::io(format!("Failed to read tar entry {}", archive_path.display()), &e)
        })?;

        let entry_path = entry
            .path()
            .map_err(|e| InstallError::io("Failed to get entry path", &e))?
            .into_owned();

        if entry_path.is_absolute()
            || entry_path
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::RootDir))
        {
            return Err(InstallError::filesystem(format!(
                "Refusing to extract path with parent directory or absolute reference: {}",
                entry_path.display()
            )));
        }

        entry.unpack_in(dest_dir).map_err(|e| {
            InstallError::io(
                format!("Failed to extract {}", dest_dir.join(&entry_path).display()),
                &e,
            )
        })?;
        count += 1;
    }

    debug!(archive = %archive_path.display(), dest = %dest_dir.display(), entries = count, "archive extracted");
    Ok(())
}

fn is_tar_gz(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    name.ends_with(".tar.gz") || name.ends_with(".tgz")
}
