//! Remove command

use anyhow::Result;
use fluffbox_core::RuntimeManager;
use fluffbox_schema::RuntimeKind;

use crate::ui::Output;

/// Remove one installed version.
pub async fn remove(
    manager: &RuntimeManager,
    output: &Output,
    kind: RuntimeKind,
    version: &str,
    yes: bool,
) -> Result<()> {
    if !yes
        && !super::confirm(&format!(
            "This will delete {} {version}. Continue?",
            kind.display_name()
        ))?
    {
        output.error("Operation cancelled");
        return Ok(());
    }

    manager.delete(kind, version).await?;
    output.success(&format!("Removed {} {version}", kind.display_name()));
    Ok(())
}
