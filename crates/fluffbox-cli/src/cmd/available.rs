//! Available command

use anyhow::{Context, Result};
use fluffbox_core::RuntimeManager;
use fluffbox_schema::RuntimeKind;

use crate::ui::table;

/// Show releases installable on this platform, newest first.
pub async fn available(
    manager: &RuntimeManager,
    kind: RuntimeKind,
    lts_only: bool,
    limit: usize,
    json: bool,
) -> Result<()> {
    let releases = manager
        .list_available(kind)
        .await
        .with_context(|| format!("Failed to fetch {} releases", kind.display_name()))?;

    let shown: Vec<_> = releases
        .into_iter()
        .filter(|r| !lts_only || r.lts.is_some())
        .take(if limit == 0 { usize::MAX } else { limit })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    if shown.is_empty() {
        println!();
        println!("  No {} releases found for {}.", kind.display_name(), manager.platform());
        return Ok(());
    }

    let installed = manager.list_installed(kind)?;
    println!("{}", table::releases(&shown, &installed));
    Ok(())
}
