//! Check command

use anyhow::Result;
use crossterm::style::Stylize;
use fluffbox_core::RuntimeManager;
use fluffbox_schema::RuntimeKind;

use crate::ui::Output;

/// Report whether each runtime can be reached from a shell.
pub async fn check(manager: &RuntimeManager, output: &Output, kind: Option<RuntimeKind>) -> Result<()> {
    let kinds = kind.map_or_else(|| RuntimeKind::ALL.to_vec(), |k| vec![k]);
    let icons = output.icons();

    for kind in kinds {
        let status = manager.check_accessible(kind).await;
        let icon = if status.accessible {
            icons.success.green()
        } else {
            icons.error.red()
        };
        println!(
            "  {icon} {:<8} {}",
            kind.display_name(),
            status.description
        );
    }
    Ok(())
}
