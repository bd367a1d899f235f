//! Checksum verification for downloaded archives.
//!
//! The digest is computed by streaming the file through SHA-256 so that
//! archives of any size are verified in constant memory.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::InstallError;

/// Verifies that a file matches the expected SHA-256 checksum.
///
/// The comparison is case-insensitive on the hex digits and otherwise exact.
///
/// # Errors
///
/// - [`InstallError::Filesystem`] if the file cannot be opened or read
/// - [`InstallError::ChecksumMismatch`] if the computed digest differs
pub fn verify_checksum(file_path: &Path, expected: &str) -> Result<(), InstallError> {
    let computed = compute_sha256(file_path)?;

    if !computed.eq_ignore_ascii_case(expected.trim()) {
        return Err(InstallError::checksum_mismatch(
            expected.trim().to_lowercase(),
            computed,
        ));
    }

    Ok(())
}

/// Computes the SHA-256 hash of a file as a lowercase hex string.
///
/// # Errors
///
/// Returns [`InstallError::Filesystem`] if the file cannot be opened or read.
pub fn compute_sha256(file_path: &Path) -> Result<String, InstallError> {
    let mut file = std::fs::File::open(file_path).map_err(|e| {
        InstallError::io(
            format!("Failed to open file for checksum {}", file_path.display()),
            &e,
        )
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(|e| {
            InstallError::io(
                format!("Failed to read file for checksum {}", file_path.display()),
                &e,
            )
        })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
