//! Install command

use anyhow::Result;
use fluffbox_core::{Reporter, RuntimeManager};
use fluffbox_schema::{InstallOutcome, RuntimeKind};

use crate::ui::Output;

/// Install `version` of `kind`.
pub async fn install(
    manager: &RuntimeManager,
    output: &Output,
    kind: RuntimeKind,
    version: &str,
) -> Result<()> {
    output.section(&format!("Installing {} {version}", kind.display_name()));

    match manager.install_version(kind, version).await? {
        InstallOutcome::Installed => {
            output.success(&format!("{} {version} installed", kind.display_name()));
            output.detail(&format!("Run 'fluffbox use {kind} {version}' to activate it."));
        }
        InstallOutcome::AlreadyPresent => {
            output.success(&format!(
                "{} {version} is already installed",
                kind.display_name()
            ));
        }
    }
    Ok(())
}
