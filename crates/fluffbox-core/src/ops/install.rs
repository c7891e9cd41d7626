//! Download a release and unpack it into its version directory.
//!
//! Installation is all-or-nothing: the version directory exists afterwards
//! only if every step succeeded, so a retry never sees a half-unpacked tree.

use std::path::{Path, PathBuf};

use fluffbox_schema::{InstallOutcome, Release};

use super::{Context, ManagerError};
use crate::io::download::DownloadRequest;
use crate::io::extract::{run_native_installer, unpack};
use crate::paths::tmp_path;
use crate::registry::version_dir;
use crate::runtimes::Runtime;

/// Install `release`, or report that its version directory already exists.
pub async fn install_release(
    ctx: &Context,
    runtime: &dyn Runtime,
    release: &Release,
) -> Result<InstallOutcome, ManagerError> {
    let kind = runtime.kind();
    let version = release.version.as_str();
    let install_dir =
        version_dir(runtime, &ctx.home, version).ok_or_else(|| ManagerError::NotFound {
            kind,
            version: version.to_string(),
        })?;

    if install_dir.exists() {
        tracing::debug!(%kind, version, "Already installed");
        ctx.reporter.info(&format!("{} {version} is already installed", kind.display_name()));
        return Ok(InstallOutcome::AlreadyPresent);
    }

    let download_path = tmp_path(&ctx.home).join(download_name(release, kind.as_str()));
    tokio::fs::create_dir_all(&install_dir).await?;

    let result = fetch_and_unpack(ctx, runtime, release, &download_path, &install_dir).await;

    if let Err(e) = tokio::fs::remove_file(&download_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %download_path.display(), error = %e, "Failed to remove download");
        }
    }

    match result {
        Ok(()) => {
            let entry = runtime.entry_point(&install_dir);
            if !entry.exists() {
                ctx.reporter.warning(&format!(
                    "{} {version} installed but {} is missing",
                    kind.display_name(),
                    entry.display()
                ));
            }
            tracing::info!(%kind, version, dir = %install_dir.display(), "Installed");
            ctx.reporter.done(kind, version, "installed");
            Ok(InstallOutcome::Installed)
        }
        Err(e) => {
            if let Err(cleanup) = tokio::fs::remove_dir_all(&install_dir).await {
                tracing::warn!(dir = %install_dir.display(), error = %cleanup, "Failed to remove partial install");
            }
            ctx.reporter.failed(kind, version, &e.to_string());
            Err(e)
        }
    }
}

async fn fetch_and_unpack(
    ctx: &Context,
    runtime: &dyn Runtime,
    release: &Release,
    download_path: &Path,
    install_dir: &Path,
) -> Result<(), ManagerError> {
    let kind = runtime.kind();
    let version = release.version.as_str();

    tracing::debug!(%kind, version, url = %release.download_url, "Downloading");
    DownloadRequest::new(
        &ctx.client,
        kind,
        version,
        &release.download_url,
        download_path,
        &ctx.reporter,
    )
    .execute()
    .await
    .map_err(|e| ManagerError::context("Download failed", format!("{kind} {version}: {e}")))?;

    ctx.reporter.extracting(kind, version);
    let native = runtime.uses_native_installer(release);
    let hint = runtime.wrapper_hint(release);
    let archive = download_path.to_path_buf();
    let dest: PathBuf = install_dir.to_path_buf();

    tokio::task::spawn_blocking(move || {
        if native {
            run_native_installer(&archive, &dest)
        } else {
            unpack(&archive, &dest, hint.as_deref())
        }
    })
    .await
    .map_err(|e| ManagerError::context("Extraction task failed", e))?
    .map_err(|e| ManagerError::context("Extraction failed", format!("{kind} {version}: {e}")))
}

/// Local file name for the download; never contains a path separator.
fn download_name(release: &Release, kind: &str) -> String {
    let name = Path::new(&release.file_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name.is_empty() {
        format!("{kind}-{}.download", release.version)
    } else {
        name
    }
}
