//! Metadata prober — one stat call per path, per pass.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use filetime::FileTime;

use crate::error::{io_err, CoreError};
use crate::types::{EntryKind, PathEntry};

/// Probe a path's metadata.
///
/// Returns `Ok(None)` when the path does not exist. Any other stat failure
/// (permission denied, I/O error) is an error: partial knowledge of a tree
/// is unsafe to reconcile from, so callers abort the run. No retries.
pub fn probe(path: &Path) -> Result<Option<PathEntry>, CoreError> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(entry_from_metadata(&metadata))),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

fn entry_from_metadata(metadata: &fs::Metadata) -> PathEntry {
    let kind = if metadata.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    };
    PathEntry {
        kind,
        size: metadata.len(),
        mode: mode_bits(metadata),
        mtime: FileTime::from_last_modification_time(metadata),
        atime: FileTime::from_last_access_time(metadata),
    }
}

#[cfg(unix)]
fn mode_bits(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn mode_bits(_metadata: &fs::Metadata) -> u32 {
    0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
