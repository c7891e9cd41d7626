//! Use command

use anyhow::Result;
use fluffbox_core::{Reporter, RuntimeManager};
use fluffbox_schema::RuntimeKind;

use crate::ui::Output;

/// Make `version` the active version of `kind`.
pub async fn use_version(
    manager: &RuntimeManager,
    output: &Output,
    kind: RuntimeKind,
    version: &str,
) -> Result<()> {
    let activation = manager.activate(kind, version).await?;

    output.success(&format!(
        "{} {} is now active",
        kind.display_name(),
        activation.version
    ));
    for entry in &activation.path_entries {
        output.detail(&format!("PATH += {}", entry.display()));
    }
    if let Some((name, value)) = &activation.home_var {
        output.detail(&format!("{name} = {}", value.display()));
    }
    if activation.restart_required {
        output.warning("Open a new terminal for the change to take effect.");
    }
    Ok(())
}
