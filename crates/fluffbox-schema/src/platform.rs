//! Host platform detection and per-upstream naming.
//!
//! Each upstream spells the same machine differently: Node.js calls 64-bit ARM
//! `arm64`, Adoptium calls it `aarch64`, python.org calls 64-bit Intel `amd64`.
//! [`Platform::for_kind`] translates the host into the vocabulary a given
//! runtime kind's index uses.
//!
//! # Example
//!
//! ```
//! use fluffbox_schema::{Arch, Os, Platform, RuntimeKind};
//!
//! let platform = Platform::new(Os::MacOs, Arch::Arm64);
//! assert_eq!(platform.for_kind(RuntimeKind::Node).arch_token, "arm64");
//! assert_eq!(platform.for_kind(RuntimeKind::Java).arch_token, "aarch64");
//! ```

use crate::RuntimeKind;

/// Errors raised while detecting the host platform.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The operating system has no upstream builds for any managed runtime.
    #[error("Unsupported operating system: {0}")]
    UnsupportedOs(String),

    /// The CPU architecture has no upstream builds for any managed runtime.
    #[error("Unsupported architecture: {0}")]
    UnsupportedArch(String),
}

/// Host operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Microsoft Windows.
    Windows,
    /// Apple macOS.
    MacOs,
    /// Linux (glibc).
    Linux,
}

/// Host CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 64-bit Intel/AMD.
    X64,
    /// 32-bit Intel.
    X86,
    /// 64-bit ARM (Apple Silicon, Graviton, ...).
    Arm64,
}

impl Os {
    /// Parse a `std::env::consts::OS` value.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::UnsupportedOs`] for anything but Windows, macOS and Linux.
    pub fn from_consts(os: &str) -> Result<Self, PlatformError> {
        match os {
            "windows" => Ok(Self::Windows),
            "macos" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            other => Err(PlatformError::UnsupportedOs(other.to_string())),
        }
    }

    /// Suffix of executables (`.exe` on Windows, empty elsewhere).
    pub fn executable_ext(&self) -> &'static str {
        match self {
            Self::Windows => ".exe",
            Self::MacOs | Self::Linux => "",
        }
    }

    /// Archive flavour upstreams publish for this OS.
    ///
    /// Windows builds ship as compressed folders, Unix builds as gzipped tarballs.
    pub fn archive_ext(&self) -> &'static str {
        match self {
            Self::Windows => ".zip",
            Self::MacOs | Self::Linux => ".tar.gz",
        }
    }

    /// Separator between entries of the `PATH` variable.
    pub fn path_separator(&self) -> char {
        match self {
            Self::Windows => ';',
            Self::MacOs | Self::Linux => ':',
        }
    }
}

impl Arch {
    /// Parse a `std::env::consts::ARCH` value.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::UnsupportedArch`] for architectures no upstream builds for.
    pub fn from_consts(arch: &str) -> Result<Self, PlatformError> {
        match arch {
            "x86_64" => Ok(Self::X64),
            "x86" => Ok(Self::X86),
            "aarch64" => Ok(Self::Arm64),
            other => Err(PlatformError::UnsupportedArch(other.to_string())),
        }
    }

    /// Rust-convention architecture name, as used in target triples.
    pub fn rust_name(&self) -> &'static str {
        match self {
            Self::X64 => "x86_64",
            Self::X86 => "i686",
            Self::Arm64 => "aarch64",
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
        };
        write!(f, "{name}")
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::X64 => "x64",
            Self::X86 => "x86",
            Self::Arm64 => "arm64",
        };
        write!(f, "{name}")
    }
}

/// The host machine: operating system plus CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

/// Host platform translated into one runtime kind's upstream vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindPlatform {
    /// Operating system.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
    /// Executable suffix (`.exe` or empty).
    pub executable_ext: &'static str,
    /// Archive extension published for this platform, including the leading dot.
    pub archive_ext: &'static str,
    /// Upstream's name for the operating system (`win`, `mac`, `macos`, ...).
    pub platform_token: &'static str,
    /// Upstream's name for the architecture (`x64`, `amd64`, `aarch64`, ...).
    pub arch_token: &'static str,
    /// Implementation flavour requested from the upstream (JVM implementation for Java).
    pub impl_token: &'static str,
}

impl Platform {
    /// Build a platform description explicitly.
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Detect the platform this binary was compiled for.
    ///
    /// # Errors
    ///
    /// Fails immediately on hosts no upstream publishes builds for; callers
    /// should surface this at startup rather than attempting any operation.
    pub fn detect() -> Result<Self, PlatformError> {
        Self::from_consts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Build a platform from `std::env::consts`-style names.
    ///
    /// # Errors
    ///
    /// Returns a [`PlatformError`] naming the unsupported component.
    pub fn from_consts(os: &str, arch: &str) -> Result<Self, PlatformError> {
        Ok(Self {
            os: Os::from_consts(os)?,
            arch: Arch::from_consts(arch)?,
        })
    }

    /// Target triple used by projects that publish per-triple builds
    /// (e.g. `aarch64-apple-darwin`).
    pub fn target_triple(&self) -> String {
        let vendor_os = match self.os {
            Os::Windows => "pc-windows-msvc",
            Os::MacOs => "apple-darwin",
            Os::Linux => "unknown-linux-gnu",
        };
        format!("{}-{vendor_os}", self.arch.rust_name())
    }

    /// Translate this platform into `kind`'s upstream naming conventions.
    pub fn for_kind(&self, kind: RuntimeKind) -> KindPlatform {
        let (platform_token, arch_token, impl_token) = match kind {
            RuntimeKind::Node => (
                match self.os {
                    Os::Windows => "win",
                    Os::MacOs => "darwin",
                    Os::Linux => "linux",
                },
                match self.arch {
                    Arch::X64 => "x64",
                    Arch::X86 => "x86",
                    Arch::Arm64 => "arm64",
                },
                "",
            ),
            RuntimeKind::Python => (
                match self.os {
                    Os::Windows => "windows",
                    Os::MacOs => "macos",
                    Os::Linux => "linux",
                },
                match self.arch {
                    Arch::X64 => "amd64",
                    Arch::X86 => "win32",
                    Arch::Arm64 => "arm64",
                },
                "",
            ),
            RuntimeKind::Java => (
                match self.os {
                    Os::Windows => "windows",
                    Os::MacOs => "mac",
                    Os::Linux => "linux",
                },
                match self.arch {
                    Arch::X64 => "x64",
                    Arch::X86 => "x86",
                    Arch::Arm64 => "aarch64",
                },
                "hotspot",
            ),
        };

        KindPlatform {
            os: self.os,
            arch: self.arch,
            executable_ext: self.os.executable_ext(),
            archive_ext: self.os.archive_ext(),
            platform_token,
            arch_token,
            impl_token,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_os_is_rejected() {
        assert_eq!(
            Platform::from_consts("freebsd", "x86_64"),
            Err(PlatformError::UnsupportedOs("freebsd".to_string()))
        );
        assert!(matches!(
            Platform::from_consts("linux", "riscv64"),
            Err(PlatformError::UnsupportedArch(_))
        ));
    }

    #[test]
    fn test_arm_naming_differs_per_upstream() {
        let p = Platform::new(Os::Linux, Arch::Arm64);
        assert_eq!(p.for_kind(RuntimeKind::Node).arch_token, "arm64");
        assert_eq!(p.for_kind(RuntimeKind::Python).arch_token, "arm64");
        assert_eq!(p.for_kind(RuntimeKind::Java).arch_token, "aarch64");
    }

    #[test]
    fn test_windows_descriptor() {
        let p = Platform::new(Os::Windows, Arch::X64).for_kind(RuntimeKind::Python);
        assert_eq!(p.executable_ext, ".exe");
        assert_eq!(p.archive_ext, ".zip");
        assert_eq!(p.platform_token, "windows");
        assert_eq!(p.arch_token, "amd64");
    }

    #[test]
    fn test_java_uses_mac_token_and_hotspot() {
        let p = Platform::new(Os::MacOs, Arch::X64).for_kind(RuntimeKind::Java);
        assert_eq!(p.platform_token, "mac");
        assert_eq!(p.impl_token, "hotspot");
        assert_eq!(p.archive_ext, ".tar.gz");
        assert_eq!(p.executable_ext, "");
    }

    #[test]
    fn test_target_triple() {
        assert_eq!(
            Platform::new(Os::MacOs, Arch::Arm64).target_triple(),
            "aarch64-apple-darwin"
        );
        assert_eq!(
            Platform::new(Os::Linux, Arch::X64).target_triple(),
            "x86_64-unknown-linux-gnu"
        );
        assert_eq!(
            Platform::new(Os::Windows, Arch::X86).target_triple(),
            "i686-pc-windows-msvc"
        );
    }
}
