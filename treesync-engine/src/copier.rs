//! Entry copier — streams bytes between two paths.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::{io_err, EngineError};

/// Copy all bytes from `source` to `dest`, creating the destination if
/// absent and truncating it if present.
///
/// Only content is copied; mode bits and timestamps are the propagator's
/// job, so a freshly copied file carries default permissions and a current
/// mtime until the propagation pass runs. Both file handles live only for
/// the duration of this call and are released on success and error paths
/// alike.
///
/// Returns the number of bytes written. A byte count that disagrees with
/// the source length fails the copy rather than leaving a silently
/// truncated destination.
pub fn copy_entry(source: &Path, dest: &Path) -> Result<u64, EngineError> {
    let mut reader = File::open(source).map_err(|e| io_err(source, e))?;
    let expected = reader.metadata().map_err(|e| io_err(source, e))?.len();

    let mut writer = File::create(dest).map_err(|e| io_err(dest, e))?;
    let written = io::copy(&mut reader, &mut writer).map_err(|e| io_err(dest, e))?;

    if written != expected {
        return Err(EngineError::ShortCopy {
            path: dest.to_path_buf(),
            expected,
            written,
        });
    }

    tracing::debug!(
        "copied {} -> {} ({} bytes)",
        source.display(),
        dest.display(),
        written
    );
    Ok(written)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
