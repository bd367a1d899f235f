//! Target platform in release catalog naming.
//!
//! The catalog identifies archives by `os` and `arch` strings that follow the
//! toolchain's own conventions (`darwin`, `amd64`, `armv6l`, ...), which differ
//! from the names Rust reports in [`std::env::consts`].

use std::fmt;

/// An `os`/`arch` pair as it appears in catalog file entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    /// Operating system, e.g. `linux`.
    pub os: String,
    /// Architecture, e.g. `amd64`.
    pub arch: String,
}

impl Target {
    /// Creates a target from catalog-style names.
    #[must_use]
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Returns the target of the running host.
    #[must_use]
    pub fn host() -> Self {
        Self::from_rust(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Maps Rust's OS and architecture names to catalog names.
    ///
    /// Names without a known mapping are passed through unchanged.
    #[must_use]
    pub fn from_rust(os: &str, arch: &str) -> Self {
        let os = match os {
            "macos" => "darwin",
            other => other,
        };
        let arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            "arm" => "armv6l",
            "powerpc64" => "ppc64le",
            other => other,
        };
        Self::new(os, arch)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_linux_x86_64() {
        assert_eq!(
            Target::from_rust("linux", "x86_64"),
            Target::new("linux", "amd64")
        );
    }

    #[test]
    fn maps_macos_aarch64() {
        assert_eq!(
            Target::from_rust("macos", "aarch64"),
            Target::new("darwin", "arm64")
        );
    }

    #[test]
    fn maps_32_bit_architectures() {
        assert_eq!(Target::from_rust("linux", "x86").arch, "386");
        assert_eq!(Target::from_rust("linux", "arm").arch, "armv6l");
        assert_eq!(Target::from_rust("linux", "powerpc64").arch, "ppc64le");
    }

    #[test]
    fn passes_unknown_names_through() {
        assert_eq!(
            Target::from_rust("freebsd", "riscv64"),
            Target::new("freebsd", "riscv64")
        );
    }

    #[test]
    fn display_uses_slash() {
        assert_eq!(Target::new("linux", "amd64").to_string(), "linux/amd64");
    }
}
