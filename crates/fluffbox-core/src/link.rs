//! The `current` pointer: a directory symlink (a junction on Windows when
//! symlinks need privileges the user does not have).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where `link` points, if it is a link whose target still exists.
///
/// Absent links, plain files, real directories and dangling links all
/// yield `None`.
pub fn read_pointer(link: &Path) -> Option<PathBuf> {
    let metadata = fs::symlink_metadata(link).ok()?;
    if !metadata.file_type().is_symlink() {
        return None;
    }

    let raw = fs::read_link(link).ok()?;
    let target = if raw.is_relative() {
        link.parent().map_or_else(|| raw.clone(), |p| p.join(&raw))
    } else {
        strip_verbatim(raw)
    };

    target.is_dir().then_some(target)
}

/// Remove `link`. An absent link is not an error.
///
/// Refuses to touch a real directory so that a user-created `current`
/// folder is never deleted recursively.
pub fn remove_pointer(link: &Path) -> io::Result<()> {
    match fs::symlink_metadata(link) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            // Directory symlinks and junctions on Windows are removed as directories.
            fs::remove_file(link).or_else(|_| fs::remove_dir(link))
        }
        Ok(metadata) if metadata.is_dir() => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} is a directory, not a link", link.display()),
        )),
        Ok(_) => fs::remove_file(link),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Point `link` at `target`, replacing any previous pointer.
///
/// On Unix the new link is created under a scratch name and renamed over
/// the old one, so readers always see either the old or the new target.
#[cfg(unix)]
pub fn replace_pointer(target: &Path, link: &Path) -> io::Result<()> {
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Ok(metadata) = fs::symlink_metadata(link) {
        if metadata.is_dir() && !metadata.file_type().is_symlink() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a directory, not a link", link.display()),
            ));
        }
    }

    let scratch = scratch_name(link);
    remove_pointer(&scratch)?;
    std::os::unix::fs::symlink(target, &scratch)?;

    if let Err(e) = fs::rename(&scratch, link) {
        let _ = fs::remove_file(&scratch);
        return Err(e);
    }
    Ok(())
}

/// Point `link` at `target`, replacing any previous pointer.
///
/// Windows cannot rename a junction over another, so the old pointer is
/// removed first; a failure in between leaves no pointer at all.
#[cfg(windows)]
pub fn replace_pointer(target: &Path, link: &Path) -> io::Result<()> {
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent)?;
    }
    remove_pointer(link)?;
    create_dir_link(target, link)
}

#[cfg(windows)]
fn create_dir_link(target: &Path, link: &Path) -> io::Result<()> {
    if std::os::windows::fs::symlink_dir(target, link).is_ok() {
        return Ok(());
    }

    // Junctions need no privilege or Developer Mode.
    let output = std::process::Command::new("cmd")
        .arg("/C")
        .arg("mklink")
        .arg("/J")
        .arg(link)
        .arg(target)
        .output()?;

    if output.status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!(
            "mklink /J failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

#[cfg(unix)]
fn scratch_name(link: &Path) -> PathBuf {
    let name = link
        .file_name()
        .map_or_else(|| "current".into(), |n| n.to_string_lossy().into_owned());
    link.with_file_name(format!(".{name}.tmp-{}", std::process::id()))
}

/// `read_link` on Windows junctions returns `\\?\C:\...`; drop the prefix so
/// paths compare equal to the ones we built.
fn strip_verbatim(path: PathBuf) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix(r"\\?\") {
        PathBuf::from(rest)
    } else {
        path
    }
}

/// Whether two paths name the same directory, comparing canonical forms
/// when both exist.
pub fn same_dir(a: &Path, b: &Path) -> bool {
    match (canonical(a), canonical(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

fn canonical(p: &Path) -> Option<PathBuf> {
    fs::canonicalize(p).ok().map(strip_verbatim)
}
