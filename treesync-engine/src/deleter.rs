//! Recursive deleter — post-order subtree removal.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{io_err, EngineError};

/// Delete a directory subtree, children before parents.
///
/// Removing a non-empty directory fails on every common filesystem, so the
/// walk is strictly post-order. A missing path is an idempotent no-op.
///
/// Individual file removals are best-effort: a failure is logged and
/// siblings continue, but the containing directory (whose removal would be
/// guaranteed to fail) is then left in place. Returns `Ok(true)` when the
/// subtree is fully gone, `Ok(false)` when something survived. Failing to
/// list a directory, or to remove an emptied one, is fatal.
pub fn delete_tree(path: &Path) -> Result<bool, EngineError> {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(true),
        Err(err) => return Err(io_err(path, err)),
    };

    let mut complete = true;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(path, e))?;
        let child = entry.path();
        let file_type = entry.file_type().map_err(|e| io_err(&child, e))?;

        if file_type.is_dir() {
            complete &= delete_tree(&child)?;
        } else {
            // Symlinks are unlinked, never followed.
            match fs::remove_file(&child) {
                Ok(()) => {}
                Err(err) => {
                    tracing::warn!("could not remove {}: {err}", child.display());
                    complete = false;
                }
            }
        }
    }

    if !complete {
        tracing::warn!("leaving non-empty directory in place: {}", path.display());
        return Ok(false);
    }

    fs::remove_dir(path).map_err(|e| io_err(path, e))?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
