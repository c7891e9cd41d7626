use anyhow::Result;
use fluffbox_core::RuntimeManager;
use fluffbox_schema::RuntimeKind;

use crate::ui::table;

/// List installed versions of one kind, or of every kind.
pub fn list(manager: &RuntimeManager, kind: Option<RuntimeKind>, json: bool) -> Result<()> {
    let kinds = kind.map_or_else(|| RuntimeKind::ALL.to_vec(), |k| vec![k]);

    let mut rows = Vec::with_capacity(kinds.len());
    for kind in kinds {
        rows.push((kind, manager.list_installed(kind)?));
    }

    if json {
        let value: serde_json::Map<String, serde_json::Value> = rows
            .iter()
            .map(|(kind, versions)| Ok((kind.to_string(), serde_json::to_value(versions)?)))
            .collect::<Result<_, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if rows.iter().all(|(_, v)| v.installed.is_empty()) {
        println!();
        println!("  No runtimes installed.");
        println!("  Run 'fluffbox available <kind>' and 'fluffbox install <kind> <version>' to get started.");
        return Ok(());
    }

    println!("{}", table::installed(&rows));
    Ok(())
}
