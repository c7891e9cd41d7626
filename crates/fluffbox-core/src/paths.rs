use dirs::{data_dir, home_dir};
use std::path::{Path, PathBuf};

use fluffbox_schema::RuntimeKind;

/// Environment variable overriding the managed root directory.
pub const HOME_ENV: &str = "FLUFFBOX_HOME";

/// Returns the managed root directory, or None if no home can be resolved.
///
/// `FLUFFBOX_HOME` wins; otherwise the platform data directory
/// (`~/.local/share`, `~/Library/Application Support`, `%APPDATA%`) is used,
/// falling back to `~/.fluffbox`.
pub fn try_fluffbox_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var(HOME_ENV) {
        if !val.is_empty() {
            return Some(PathBuf::from(val));
        }
    }
    data_dir()
        .map(|d| d.join("fluffbox"))
        .or_else(|| home_dir().map(|h| h.join(".fluffbox")))
}

/// Root holding every installed version of `kind`: `<home>/<kind>_versions`.
pub fn kind_root(home: &Path, kind: RuntimeKind) -> PathBuf {
    home.join(kind.root_dir_name())
}

/// The active-version pointer of `kind`: `<home>/<kind>_versions/current`.
pub fn current_link(home: &Path, kind: RuntimeKind) -> PathBuf {
    kind_root(home, kind).join(CURRENT_LINK_NAME)
}

/// Name of the pointer living beside the version directories.
pub const CURRENT_LINK_NAME: &str = "current";

/// Temp path: `<home>/tmp` (same volume as the version roots).
pub fn tmp_path(home: &Path) -> PathBuf {
    home.join("tmp")
}
