//! Files-first directory recursion.
//!
//! At every level all files are handed to the callback before any
//! subdirectory is entered. Posts rely on this: `page/about.html` is synced
//! before `page/about/team.html`, so a parent always exists before its
//! children.
//!
//! Content directories are optional (a site may have no `resources/`), so a
//! missing root is walked as an empty one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::pipeline::for_each_sequential;

/// Listing a directory (or reading an entry's type) failed.
#[derive(Debug, Error)]
#[error("failed to list {path}: {source}")]
pub struct WalkError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Whether a listed entry is walked into or handed to the file callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// List `dir`, files first, each group sorted by name.
///
/// Symlinks count as files: only real directories are descended into.
pub fn list_entries(dir: &Path) -> Result<Vec<DirectoryEntry>, WalkError> {
    let walk_err = |source| WalkError {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    let mut directories = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(walk_err)? {
        let entry = entry.map_err(walk_err)?;
        let file_type = entry.file_type().map_err(|source| WalkError {
            path: entry.path(),
            source,
        })?;
        if file_type.is_dir() {
            directories.push(entry.path());
        } else {
            files.push(entry.path());
        }
    }
    files.sort();
    directories.sort();

    let files = files.into_iter().map(|path| DirectoryEntry {
        path,
        kind: EntryKind::File,
    });
    let directories = directories.into_iter().map(|path| DirectoryEntry {
        path,
        kind: EntryKind::Directory,
    });
    Ok(files.chain(directories).collect())
}

/// Walk `root`, calling `on_file` for every file, files before subdirectories
/// at each level.
///
/// A missing `root`, or one below a plain file, completes without calling
/// `on_file`. Any other failure to stat `root` is a [`WalkError`]. The first
/// error from listing or from `on_file` stops the walk and is returned.
pub fn recurse<C, E, F>(ctx: &mut C, root: &Path, on_file: &mut F) -> Result<(), E>
where
    E: From<WalkError>,
    F: FnMut(&mut C, &Path) -> Result<(), E>,
{
    match std::fs::metadata(root) {
        Ok(_) => {}
        Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            tracing::debug!("skipping missing directory {}", root.display());
            return Ok(());
        }
        Err(source) => {
            return Err(WalkError {
                path: root.to_path_buf(),
                source,
            }
            .into())
        }
    }

    let entries = list_entries(root)?;
    let (files, directories): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|entry| entry.kind == EntryKind::File);

    for_each_sequential(ctx, files, |ctx, entry| on_file(ctx, &entry.path))?;
    for_each_sequential(ctx, directories, |ctx, entry| {
        recurse(ctx, &entry.path, on_file)
    })
}

/// `/`-joined path of `path` relative to `base`, without touching the filesystem.
pub fn relative_key(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
