//! Is the kind's executable reachable, and which version is it?

use std::path::Path;
use std::time::Duration;

use fluffbox_schema::Accessibility;

use super::Context;
use crate::paths::current_link;
use crate::registry::current_version;
use crate::runtimes::Runtime;

const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Look for the executable on this process's `PATH`, falling back to the
/// `current` pointer (active but not yet visible to this shell).
pub async fn check_accessible(ctx: &Context, runtime: &dyn Runtime) -> Accessibility {
    let kind = runtime.kind();
    let name = kind.display_name();

    if let Ok(path) = which::which(runtime.executable_name()) {
        if let Some(version) = probe_version(&path, runtime.version_args()).await {
            return Accessibility {
                accessible: true,
                description: format!("{name} on PATH: {version} ({})", path.display()),
            };
        }
        tracing::debug!(%kind, path = %path.display(), "Executable found but did not report a version");
    }

    if let Some(version) = current_version(runtime, &ctx.home) {
        return Accessibility {
            accessible: true,
            description: format!(
                "{name} {version} is active via {} (open a new shell if it is not on PATH yet)",
                current_link(&ctx.home, kind).display()
            ),
        };
    }

    Accessibility {
        accessible: false,
        description: format!("{name} is not reachable from PATH and no version is active"),
    }
}

/// First line the executable prints for its version flag (stdout, else stderr).
async fn probe_version(path: &Path, args: &[&str]) -> Option<String> {
    let output = tokio::time::timeout(
        VERSION_PROBE_TIMEOUT,
        tokio::process::Command::new(path).args(args).output(),
    )
    .await
    .ok()?
    .ok()?;

    if !output.status.success() {
        return None;
    }

    let text = if output.stdout.is_empty() {
        output.stderr
    } else {
        output.stdout
    };
    String::from_utf8_lossy(&text)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}
