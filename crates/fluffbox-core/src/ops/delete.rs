//! Deletion guard: remove an installed version unless it is active.

use fluffbox_schema::RuntimeKind;

use super::{Context, ManagerError};
use crate::link::{read_pointer, same_dir};
use crate::paths::{current_link, kind_root};
use crate::registry::{installed, version_dir};
use crate::runtimes::Runtime;

/// Remove `version`'s directory.
///
/// Irreversible; callers confirm with the user first. Nothing is touched if
/// the version is missing or active.
pub async fn delete_version(
    ctx: &Context,
    runtime: &dyn Runtime,
    version: &str,
) -> Result<(), ManagerError> {
    let kind = runtime.kind();
    let not_found = || ManagerError::NotFound {
        kind,
        version: version.to_string(),
    };
    let dir = version_dir(runtime, &ctx.home, version).ok_or_else(not_found)?;

    if !dir.is_dir() {
        return Err(not_found());
    }

    if let Some(active) = read_pointer(&current_link(&ctx.home, kind)) {
        if same_dir(&active, &dir) {
            return Err(ManagerError::ActiveVersionUndeletable {
                kind,
                version: version.to_string(),
            });
        }
    }

    tokio::fs::remove_dir_all(&dir)
        .await
        .map_err(|e| ManagerError::context("Failed to remove version", format!("{kind} {version}: {e}")))?;

    tracing::info!(%kind, version, "Removed");
    ctx.reporter.done(kind, version, "removed");
    Ok(())
}

/// Remove every installed version of a kind and its `current` pointer,
/// leaving an empty root. Returns how many versions were removed.
pub async fn clear_all(ctx: &Context, runtime: &dyn Runtime) -> Result<usize, ManagerError> {
    let kind: RuntimeKind = runtime.kind();
    let root = kind_root(&ctx.home, kind);
    let count = installed(runtime, &ctx.home)?.installed.len();

    // Removes `current` as a link without following it.
    tokio::fs::remove_dir_all(&root)
        .await
        .map_err(|e| ManagerError::context("Failed to clear versions", format!("{kind}: {e}")))?;
    tokio::fs::create_dir_all(&root).await?;

    tracing::info!(%kind, count, "Cleared all versions");
    ctx.reporter.info(&format!("Removed {count} {} version(s)", kind.display_name()));
    Ok(count)
}
