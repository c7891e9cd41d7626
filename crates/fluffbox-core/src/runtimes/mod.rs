//! Per-kind runtime capabilities.
//!
//! Everything that differs between Node.js, Python and Java lives behind the
//! [`Runtime`] trait: where the release indices are and how to read them, how
//! version directories are named, what an installation must contain, and
//! which environment variables point at it. The catalog, installer,
//! registry and switcher are written once against this trait.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fluffbox_schema::{Platform, Release, RuntimeKind};
use reqwest::Client;

use crate::catalog::CatalogError;
use crate::config::Config;

pub mod java;
pub mod node;
pub mod python;

pub use java::JavaRuntime;
pub use node::NodeRuntime;
pub use python::PythonRuntime;

#[async_trait]
pub trait Runtime: Send + Sync {
    /// The kind this runtime manages.
    fn kind(&self) -> RuntimeKind;

    /// URLs of the release indices to query.
    ///
    /// Most kinds return a fixed list; some must ask the upstream which
    /// release lines exist first.
    async fn sub_indices(&self, client: &Client) -> Result<Vec<String>, CatalogError>;

    /// Parse one index body into the releases usable on this platform.
    fn parse_index(&self, url: &str, body: &str) -> Result<Vec<Release>, CatalogError>;

    /// Whether a version identifier names a prerelease, nightly or other
    /// non-GA channel.
    fn is_prerelease(&self, version: &str) -> bool;

    /// Directory name for an installed `version`.
    fn version_dir_name(&self, version: &str) -> String;

    /// Inverse of [`Runtime::version_dir_name`]; `None` for foreign entries.
    fn version_from_dir_name(&self, name: &str) -> Option<String>;

    /// Top-level folder the upstream archive normally wraps its contents in.
    fn wrapper_hint(&self, release: &Release) -> Option<String>;

    /// Whether `release` is a native installer rather than an archive.
    fn uses_native_installer(&self, _release: &Release) -> bool {
        false
    }

    /// Runtime home inside an installation (differs from the directory
    /// itself for macOS JDK bundles).
    fn runtime_home(&self, install_dir: &Path) -> PathBuf {
        install_dir.to_path_buf()
    }

    /// Executable that must exist for an installation to be activatable.
    fn entry_point(&self, install_dir: &Path) -> PathBuf;

    /// Directories to put on `PATH`, relative to an installation or to `current`.
    fn path_entries(&self, install_dir: &Path) -> Vec<PathBuf>;

    /// Home-style variable to persist alongside `PATH`.
    fn home_var(&self, _install_dir: &Path) -> Option<(&'static str, PathBuf)> {
        None
    }

    /// Lowercase substrings identifying `PATH` entries of other installs of
    /// this kind, beyond the managed root itself.
    fn path_markers(&self) -> &'static [&'static str] {
        &[]
    }

    /// Executable name to look up on `PATH`.
    fn executable_name(&self) -> &'static str;

    /// Arguments that make the executable print its version.
    fn version_args(&self) -> &'static [&'static str] {
        &["--version"]
    }
}

/// Build the runtime for `kind` on `platform` using the upstreams in `config`.
pub fn for_kind(kind: RuntimeKind, config: &Config, platform: Platform) -> Arc<dyn Runtime> {
    match kind {
        RuntimeKind::Node => Arc::new(NodeRuntime::new(&config.node_mirror, platform)),
        RuntimeKind::Python => Arc::new(PythonRuntime::new(
            &config.python_index,
            &config.python_standalone,
            platform,
        )),
        RuntimeKind::Java => Arc::new(JavaRuntime::new(&config.adoptium_api, platform)),
    }
}

/// Whether `name` looks like `<major>.<minor>.<patch>` with nothing else.
pub(crate) fn is_plain_triple(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}
