//! Run a command with the active runtime first on `PATH`.

use std::ffi::OsString;

use super::{Context, ManagerError};
use crate::link::read_pointer;
use crate::paths::current_link;
use crate::runtimes::Runtime;

/// Run `program` with `args`, the kind's `current` bin directories prepended
/// to `PATH`, and return its stdout.
///
/// Works before a new shell has picked up the persistent `PATH`.
pub async fn run_with_active(
    ctx: &Context,
    runtime: &dyn Runtime,
    program: &str,
    args: &[String],
) -> Result<String, ManagerError> {
    let kind = runtime.kind();
    let link = current_link(&ctx.home, kind);
    if read_pointer(&link).is_none() {
        return Err(ManagerError::NoActiveVersion(kind));
    }

    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let path: OsString = std::env::join_paths(
        runtime
            .path_entries(&link)
            .into_iter()
            .chain(std::env::split_paths(&inherited)),
    )
    .map_err(|e| ManagerError::context("Invalid PATH", e))?;

    // Resolve against the new PATH so `npm` finds `npm.cmd` on Windows.
    let cwd = std::env::current_dir()?;
    let resolved = which::which_in(program, Some(&path), &cwd)
        .map_or_else(|_| OsString::from(program), OsString::from);

    let mut cmd = tokio::process::Command::new(&resolved);
    cmd.args(args).env("PATH", &path);
    if let Some((name, value)) = runtime.home_var(&link) {
        cmd.env(name, value);
    }

    tracing::debug!(%kind, program = ?resolved, ?args, "Running");
    let output = cmd
        .output()
        .await
        .map_err(|e| ManagerError::context("Failed to start command", format!("{program}: {e}")))?;

    if !output.status.success() {
        return Err(ManagerError::CommandFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
