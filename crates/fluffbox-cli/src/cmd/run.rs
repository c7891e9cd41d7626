//! Run command

use std::io::Write;

use anyhow::Result;
use fluffbox_core::RuntimeManager;
use fluffbox_schema::RuntimeKind;

/// Run `program` against the active version and echo its output.
pub async fn run(manager: &RuntimeManager, kind: RuntimeKind, program: &str, args: &[String]) -> Result<()> {
    let stdout = manager.run(kind, program, args).await?;
    let mut out = std::io::stdout();
    out.write_all(stdout.as_bytes())?;
    out.flush()?;
    Ok(())
}
