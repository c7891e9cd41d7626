//! Repoint `current` and propagate it into the persistent environment.

use std::path::{Path, PathBuf};

use fluffbox_schema::{Activation, RuntimeKind};

use super::{Context, ManagerError};
use crate::link::replace_pointer;
use crate::paths::{current_link, kind_root};
use crate::registry::version_dir;
use crate::runtimes::Runtime;

/// Make `version` the active version of `runtime`'s kind.
///
/// The caller must tell the user to open a new shell: the persistent
/// environment is updated, the calling process's own environment is not.
pub async fn activate(
    ctx: &Context,
    runtime: &dyn Runtime,
    version: &str,
) -> Result<Activation, ManagerError> {
    let kind = runtime.kind();
    let Some(install_dir) = version_dir(runtime, &ctx.home, version) else {
        return Err(ManagerError::IncompleteInstallation {
            kind,
            version: version.to_string(),
            expected: kind_root(&ctx.home, kind),
        });
    };
    let entry = runtime.entry_point(&install_dir);

    if !install_dir.is_dir() || !entry.is_file() {
        return Err(ManagerError::IncompleteInstallation {
            kind,
            version: version.to_string(),
            expected: entry,
        });
    }

    let link = current_link(&ctx.home, kind);
    {
        let target = install_dir.clone();
        let link = link.clone();
        tokio::task::spawn_blocking(move || replace_pointer(&target, &link))
            .await
            .map_err(|e| ManagerError::context("Pointer task failed", e))?
            .map_err(|e| {
                ManagerError::context("Failed to update current pointer", format!("{kind} {version}: {e}"))
            })?;
    }
    tracing::info!(%kind, version, target = %install_dir.display(), "Repointed current");

    let path_entries = runtime.path_entries(&link);
    let markers = managed_markers(runtime, &ctx.home);
    let foreign = foreign_roots(runtime, &ctx.home);
    let separator = ctx.env.path_separator();
    {
        let prepend = path_entries.clone();
        ctx.env
            .update("PATH", move |old| {
                let old = old.as_deref().unwrap_or_default();
                rewrite_path(old, separator, &markers, &foreign, &prepend)
            })
            .await?;
    }

    let home_var = runtime.home_var(&link);
    if let Some((name, value)) = &home_var {
        ctx.env.set(name, &value.to_string_lossy()).await?;
    }

    let version = install_dir
        .file_name()
        .and_then(|n| runtime.version_from_dir_name(&n.to_string_lossy()))
        .unwrap_or_else(|| version.to_string());
    ctx.reporter.done(kind, &version, "activated");

    Ok(Activation {
        kind,
        version,
        path_entries,
        home_var: home_var.map(|(name, value)| (name.to_string(), value)),
        restart_required: true,
    })
}

/// Lowercase substrings marking `PATH` entries that belong to this kind.
fn managed_markers(runtime: &dyn Runtime, home: &Path) -> Vec<String> {
    let mut markers = vec![kind_root(home, runtime.kind()).to_string_lossy().to_lowercase()];
    markers.extend(runtime.path_markers().iter().map(|m| (*m).to_string()));
    markers
}

/// Lowercase roots of the other kinds; entries under them are never dropped.
fn foreign_roots(runtime: &dyn Runtime, home: &Path) -> Vec<String> {
    RuntimeKind::ALL
        .iter()
        .filter(|k| **k != runtime.kind())
        .map(|k| kind_root(home, *k).to_string_lossy().to_lowercase())
        .collect()
}

/// Drop every entry of `existing` matching a marker, then prepend `entries`.
///
/// Entries under one of the `keep` roots survive even when a marker matches.
/// Empty entries and duplicates of the prepended directories are dropped too.
///
/// ```
/// use std::path::PathBuf;
/// use fluffbox_core::ops::rewrite_path;
///
/// let rewritten = rewrite_path(
///     "/fb/nodejs_versions/v18/bin:/usr/bin",
///     ':',
///     &["/fb/nodejs_versions".to_string()],
///     &["/fb/python_versions".to_string()],
///     &[PathBuf::from("/fb/nodejs_versions/current/bin")],
/// );
/// assert_eq!(rewritten, "/fb/nodejs_versions/current/bin:/usr/bin");
/// ```
pub fn rewrite_path(
    existing: &str,
    separator: char,
    markers: &[String],
    keep: &[String],
    entries: &[PathBuf],
) -> String {
    let prepend: Vec<String> = entries
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();

    let kept = existing
        .split(separator)
        .filter(|e| !e.trim().is_empty())
        .filter(|e| {
            let lower = e.to_lowercase();
            keep.iter().any(|k| lower.starts_with(k.as_str()))
                || !markers.iter().any(|m| lower.contains(m.as_str()))
        })
        .filter(|e| !prepend.iter().any(|p| p == e))
        .map(str::to_string);

    let all: Vec<String> = prepend.iter().cloned().chain(kept).collect();
    all.join(&separator.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_java_markers_strip_foreign_jdks() {
        let markers = vec![
            "c:\\fb\\java_versions".to_string(),
            "java".to_string(),
            "jdk".to_string(),
            "jre".to_string(),
        ];
        let rewritten = rewrite_path(
            r"C:\Program Files\Eclipse Adoptium\jdk-17\bin;C:\Windows;;C:\FB\java_versions\current\bin;C:\tools",
            ';',
            &markers,
            &[],
            &[PathBuf::from(r"C:\FB\java_versions\current\bin")],
        );
        assert_eq!(
            rewritten,
            r"C:\FB\java_versions\current\bin;C:\Windows;C:\tools"
        );
    }

    #[test]
    fn test_keeps_literal_path_reference() {
        let rewritten = rewrite_path(
            "/fb/python_versions/current/bin:$PATH",
            ':',
            &["/fb/python_versions".to_string()],
            &[],
            &[PathBuf::from("/fb/python_versions/current/bin")],
        );
        assert_eq!(rewritten, "/fb/python_versions/current/bin:$PATH");
    }

    #[test]
    fn test_other_kinds_untouched() {
        let rewritten = rewrite_path(
            "/fb/nodejs_versions/current/bin:$PATH",
            ':',
            &["/fb/python_versions".to_string()],
            &[],
            &[PathBuf::from("/fb/python_versions/current/bin")],
        );
        assert_eq!(
            rewritten,
            "/fb/python_versions/current/bin:/fb/nodejs_versions/current/bin:$PATH"
        );
    }

    #[test]
    fn test_bare_markers_spare_other_kinds_roots() {
        let markers = vec![
            "/home/javadev/.fluffbox/java_versions".to_string(),
            "java".to_string(),
            "jdk".to_string(),
            "jre".to_string(),
        ];
        let keep = vec![
            "/home/javadev/.fluffbox/nodejs_versions".to_string(),
            "/home/javadev/.fluffbox/python_versions".to_string(),
        ];
        let rewritten = rewrite_path(
            "/home/javadev/.fluffbox/python_versions/current/bin:\
             /home/javadev/.fluffbox/nodejs_versions/current/bin:\
             /opt/jdk-17/bin:/home/javadev/bin:/usr/bin",
            ':',
            &markers,
            &keep,
            &[PathBuf::from("/home/javadev/.fluffbox/java_versions/current/bin")],
        );
        assert_eq!(
            rewritten,
            "/home/javadev/.fluffbox/java_versions/current/bin:\
             /home/javadev/.fluffbox/python_versions/current/bin:\
             /home/javadev/.fluffbox/nodejs_versions/current/bin:/usr/bin"
        );
    }
}
