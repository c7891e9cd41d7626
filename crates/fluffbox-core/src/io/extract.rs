//! Archive extraction module
//!
//! Unpacks `.tar.gz` and `.zip` runtime distributions into a version
//! directory and flattens the wrapper folder most of them ship with, so the
//! version directory itself is the runtime root.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::ZipArchive;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Installer failed: {0}")]
    Installer(String),
}

/// Distribution formats upstreams publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
    /// A native installer executable (python.org `.exe` builds).
    Installer,
    Unknown,
}

/// Detect archive format from file extension
pub fn detect_format(path: &Path) -> ArchiveFormat {
    let path_str = path.to_string_lossy().to_lowercase();

    if path_str.ends_with(".tar.gz") || path_str.ends_with(".tgz") {
        ArchiveFormat::TarGz
    } else if path_str.ends_with(".zip") {
        ArchiveFormat::Zip
    } else if path_str.ends_with(".exe") {
        ArchiveFormat::Installer
    } else {
        ArchiveFormat::Unknown
    }
}

/// Extract a tar.gz archive to a destination directory.
///
/// Returns the number of entries unpacked. Entries whose path would escape
/// `dest_dir` are skipped.
pub fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<usize, ExtractError> {
    let file = File::open(archive_path)?;
    let reader = BufReader::new(file);
    let gz_decoder = flate2::read::GzDecoder::new(reader);

    fs::create_dir_all(dest_dir)?;

    let mut archive = tar::Archive::new(gz_decoder);
    archive.set_preserve_permissions(true);

    let mut count = 0;
    for entry in archive.entries()? {
        let mut entry = entry?;
        if entry.unpack_in(dest_dir)? {
            count += 1;
        } else {
            tracing::warn!(path = ?entry.path().ok(), "Skipped archive entry outside destination");
        }
    }

    Ok(count)
}

/// Extract a zip archive
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<usize, ExtractError> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| ExtractError::Archive(e.to_string()))?;

    fs::create_dir_all(dest_dir)?;
    let mut count = 0;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| ExtractError::Archive(e.to_string()))?;
        let Some(relative_path) = file.enclosed_name() else {
            continue;
        };

        let absolute_path = dest_dir.join(&relative_path);
        if file.is_dir() {
            fs::create_dir_all(&absolute_path)?;
            continue;
        }

        if let Some(p) = absolute_path.parent() {
            fs::create_dir_all(p)?;
        }

        let mut outfile = File::create(&absolute_path)?;
        io::copy(&mut file, &mut outfile)?;

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&absolute_path, fs::Permissions::from_mode(mode))?;
        }

        count += 1;
    }

    Ok(count)
}

/// Unpack `archive_path` into `dest_dir` and flatten its wrapper folder.
///
/// `expected_wrapper` is the top-level folder name the upstream normally
/// uses (e.g. `node-v20.11.1-linux-x64`). When it is absent but the archive
/// holds exactly one visible directory, that directory is treated as the
/// wrapper instead.
pub fn unpack(
    archive_path: &Path,
    dest_dir: &Path,
    expected_wrapper: Option<&str>,
) -> Result<(), ExtractError> {
    let count = match detect_format(archive_path) {
        ArchiveFormat::TarGz => extract_tar_gz(archive_path, dest_dir)?,
        ArchiveFormat::Zip => extract_zip(archive_path, dest_dir)?,
        ArchiveFormat::Installer | ArchiveFormat::Unknown => {
            return Err(ExtractError::UnsupportedFormat(
                archive_path.display().to_string(),
            ));
        }
    };

    if count == 0 {
        return Err(ExtractError::Archive(format!(
            "{} contained no files",
            archive_path.display()
        )));
    }

    if let Some(wrapper) = find_wrapper(dest_dir, expected_wrapper)? {
        tracing::debug!(wrapper = %wrapper.display(), "Flattening archive wrapper");
        hoist_contents(dest_dir, &wrapper)?;
    }

    Ok(())
}

/// Locate the folder whose contents should become `dir`'s contents.
fn find_wrapper(dir: &Path, expected: Option<&str>) -> io::Result<Option<PathBuf>> {
    if let Some(name) = expected {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Ok(Some(candidate));
        }
    }

    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(Result::ok).collect();

    // Filter out hidden files (like .DS_Store)
    entries.retain(|e| !e.file_name().to_string_lossy().starts_with('.'));

    if entries.len() == 1 && entries[0].file_type()?.is_dir() {
        return Ok(Some(entries[0].path()));
    }
    Ok(None)
}

/// Move every child of `wrapper` up into `dir`, then remove `wrapper`.
///
/// The wrapper is first renamed to a hidden scratch name so that a child
/// sharing the wrapper's own name does not collide with it.
fn hoist_contents(dir: &Path, wrapper: &Path) -> io::Result<()> {
    let scratch = dir.join(".fluffbox-unwrap");
    move_path(wrapper, &scratch)?;

    for entry in fs::read_dir(&scratch)? {
        let entry = entry?;
        move_path(&entry.path(), &dir.join(entry.file_name()))?;
    }

    fs::remove_dir_all(&scratch)
}

/// Rename `from` to `to`, falling back to copy-then-delete when the rename is
/// refused with a permission error (seen with antivirus scanners and some
/// network or overlay filesystems).
pub fn move_path(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            tracing::debug!(from = %from.display(), "Rename denied, copying instead");
            copy_then_remove(from, to)
        }
        Err(e) => Err(e),
    }
}

fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    if from.is_dir() {
        fs::create_dir_all(to)?;
        fs_extra::dir::copy(
            from,
            to,
            &fs_extra::dir::CopyOptions::new()
                .content_only(true)
                .overwrite(true),
        )
        .map_err(|e| io::Error::other(format!("Copy failed: {e}")))?;
        fs::remove_dir_all(from)
    } else {
        fs_extra::file::copy(
            from,
            to,
            &fs_extra::file::CopyOptions::new().overwrite(true),
        )
        .map_err(|e| io::Error::other(format!("Copy failed: {e}")))?;
        fs::remove_file(from)
    }
}

/// Run a python.org Windows installer unattended into `target_dir`.
///
/// Installs for the current user only and lets the installer register its
/// own PATH entries.
pub fn run_native_installer(installer: &Path, target_dir: &Path) -> Result<(), ExtractError> {
    let output = std::process::Command::new(installer)
        .arg("/quiet")
        .arg("InstallAllUsers=0")
        .arg("PrependPath=1")
        .arg("Include_test=0")
        .arg(format!("TargetDir={}", target_dir.display()))
        .output()?;

    if !output.status.success() {
        return Err(ExtractError::Installer(format!(
            "{} exited with {}: {}",
            installer.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}
