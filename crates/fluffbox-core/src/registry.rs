//! Installed versions, read straight from the filesystem.
//!
//! A version is installed iff its directory exists under the kind's root;
//! the active version is whatever `current` points at. There is no other
//! state to keep in sync.

use std::path::{Path, PathBuf};

use fluffbox_schema::{InstalledVersions, sort_descending};

use crate::link::read_pointer;
use crate::paths::{current_link, kind_root};
use crate::runtimes::Runtime;

/// Installed versions of `runtime`'s kind under `home`, newest first.
///
/// The kind's root is created if missing. An absent, dangling or foreign
/// `current` pointer reads as "no active version".
pub fn installed(runtime: &dyn Runtime, home: &Path) -> std::io::Result<InstalledVersions> {
    let root = kind_root(home, runtime.kind());
    std::fs::create_dir_all(&root)?;

    let mut versions = Vec::new();
    for entry in std::fs::read_dir(&root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(version) = runtime.version_from_dir_name(&entry.file_name().to_string_lossy()) {
            versions.push(version);
        }
    }
    sort_descending(&mut versions);

    let current = current_version(runtime, home).filter(|v| versions.contains(v));

    Ok(InstalledVersions {
        installed: versions,
        current,
    })
}

/// Version targeted by `current`, if the pointer resolves to a version
/// directory of this kind.
pub fn current_version(runtime: &dyn Runtime, home: &Path) -> Option<String> {
    let target = read_pointer(&current_link(home, runtime.kind()))?;
    let name = target.file_name()?.to_string_lossy().into_owned();
    runtime.version_from_dir_name(&name)
}

/// Directory an installed `version` lives in.
///
/// `None` unless `version` maps to a single entry of the kind's root that
/// the kind would list as installed; `.`, `..` and anything with a path
/// separator never do.
pub fn version_dir(runtime: &dyn Runtime, home: &Path, version: &str) -> Option<PathBuf> {
    let name = runtime.version_dir_name(version);
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return None;
    }
    runtime.version_from_dir_name(&name)?;
    Some(kind_root(home, runtime.kind()).join(name))
}
