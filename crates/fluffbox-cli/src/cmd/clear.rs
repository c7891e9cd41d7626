//! Clear command

use anyhow::Result;
use fluffbox_core::RuntimeManager;
use fluffbox_schema::RuntimeKind;

use crate::ui::Output;

/// Remove every installed version of `kind`, including the active one.
pub async fn clear(manager: &RuntimeManager, output: &Output, kind: RuntimeKind, yes: bool) -> Result<()> {
    let installed = manager.list_installed(kind)?;
    if installed.installed.is_empty() {
        output.success(&format!("No {} versions installed", kind.display_name()));
        return Ok(());
    }

    if !yes
        && !super::confirm(&format!(
            "This will delete all {} {} version(s). Continue?",
            installed.installed.len(),
            kind.display_name()
        ))?
    {
        output.error("Operation cancelled");
        return Ok(());
    }

    let removed = manager.clear(kind).await?;
    output.success(&format!(
        "Removed {removed} {} version(s)",
        kind.display_name()
    ));
    Ok(())
}
