//! Data exchanged across the library boundary.
//!
//! Releases flow from the catalog to the installer; the rest describe
//! results reported back to callers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::RuntimeKind;

/// One installable unit advertised by an upstream index.
///
/// Produced by the catalog resolver and consumed once by the installer;
/// releases are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Version identifier as the kind names it (e.g. `v20.11.1`, `3.12.2`, `21.0.2+13`).
    pub version: String,

    /// Where the archive (or native installer) can be downloaded from.
    pub download_url: String,

    /// File name of the download, taken from the last URL segment.
    pub file_name: String,

    /// Upstream build tag when several builds of one version exist (e.g. a release date).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,

    /// Long-term-support codename, for upstreams that publish one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lts: Option<String>,
}

impl Release {
    /// Create a release, deriving `file_name` from the download URL.
    pub fn new(version: impl Into<String>, download_url: impl Into<String>) -> Self {
        let download_url = download_url.into();
        let file_name = filename_from_url(&download_url).to_string();
        Self {
            version: version.into(),
            download_url,
            file_name,
            build: None,
            lts: None,
        }
    }

    /// Attach an upstream build tag.
    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into());
        self
    }

    /// Attach an LTS codename.
    pub fn with_lts(mut self, lts: impl Into<String>) -> Self {
        self.lts = Some(lts.into());
        self
    }
}

/// Installed versions of one kind and the one the `current` pointer targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledVersions {
    /// Installed version identifiers, newest first.
    pub installed: Vec<String>,
    /// Active version, or `None` when the pointer is absent or dangling.
    pub current: Option<String>,
}

/// Result of an install request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallOutcome {
    /// The release was downloaded and unpacked.
    Installed,
    /// A directory for this version already existed; nothing was downloaded.
    AlreadyPresent,
}

impl std::fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Installed => write!(f, "installed"),
            Self::AlreadyPresent => write!(f, "already-present"),
        }
    }
}

/// Whether a kind's executable can be reached, and what was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessibility {
    /// `true` when the executable is on `PATH` or a `current` pointer exists.
    pub accessible: bool,
    /// Human-readable description of what was detected.
    pub description: String,
}

/// What an activation changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activation {
    /// Kind that was switched.
    pub kind: RuntimeKind,
    /// Version now targeted by the `current` pointer.
    pub version: String,
    /// Entries prepended to the persistent `PATH`.
    pub path_entries: Vec<PathBuf>,
    /// Home-style variable written alongside `PATH`, if the kind uses one.
    pub home_var: Option<(String, PathBuf)>,
    /// Always `true`: persistent variables are only seen by new shells or sessions.
    pub restart_required: bool,
}

/// Extract the filename from a URL.
///
/// ```
/// use fluffbox_schema::filename_from_url;
///
/// assert_eq!(filename_from_url("https://nodejs.org/dist/v20.0.0/node-v20.0.0-linux-x64.tar.gz"), "node-v20.0.0-linux-x64.tar.gz");
/// assert_eq!(filename_from_url(""), "");
/// ```
pub fn filename_from_url(url: &str) -> &str {
    let without_query = url.split(['?', '#']).next().unwrap_or("");
    without_query.split('/').next_back().unwrap_or("")
}
