use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::errors::SyncError;

pub fn ensure_dir_exists(name: &'static str, path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    debug!(name, path = %path.display(), "creating directory");
    fs::create_dir_all(path)
        .map(|()| true)
        .with_context(|| SyncError::CreatingDirectory {
            name,
            path: PathBuf::from(path),
        })
}

pub fn read_file(name: &'static str, path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| SyncError::ReadingFile {
        name,
        path: PathBuf::from(path),
    })
}

/// Replaces `path` with `contents` by writing a sibling temporary file and
/// renaming it over the destination.
pub fn write_file(name: &'static str, path: &Path, contents: &str) -> Result<()> {
    write_file_(path, contents).with_context(|| SyncError::WritingFile {
        name,
        path: PathBuf::from(path),
    })
}

fn write_file_(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let existing = match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".rust-dist-sync-")
        .tempfile_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    // The temporary file is private; the result keeps the mode of the file
    // it replaces.
    match existing {
        Some(perms) => tmp.as_file().set_permissions(perms)?,
        None => set_new_file_permissions(tmp.as_file())?,
    }
    tmp.as_file().sync_data()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn set_new_file_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_new_file_permissions(_: &fs::File) -> io::Result<()> {
    Ok(())
}
