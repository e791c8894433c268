//! Metadata propagator — second pass over the aligned trees.
//!
//! Runs after reconciliation has converged, so every source path has a
//! destination counterpart. For each matched pair the destination's mode
//! bits and access/modification times are brought in line with the source,
//! children before their directory, so a directory's propagated timestamp
//! is applied only after all work inside it is finished.

use std::fs;
use std::path::Path;

use treesync_core::probe::probe;
use treesync_core::types::{ChangeEvent, ChangeKind, EntryKind, PathEntry, SyncPair};

use crate::error::{io_err, EngineError};
use crate::reporter::Reporter;

/// Propagate mode bits and timestamps for one pair, depth-first.
///
/// Both sides must exist — propagation always follows a completed
/// reconciliation, so a missing side is an invariant violation and fails
/// the run rather than being silently skipped.
pub fn propagate(pair: &SyncPair, reporter: &mut dyn Reporter) -> Result<(), EngineError> {
    let src = require(pair, probe(&pair.source)?)?;
    let dst = require(pair, probe(&pair.dest)?)?;

    if src.kind != dst.kind {
        return Err(EngineError::KindConflict {
            src: pair.source.clone(),
            dest: pair.dest.clone(),
        });
    }

    if src.kind == EntryKind::Directory {
        for name in list_names(&pair.source)? {
            propagate(&pair.child(&name), reporter)?;
        }
    }

    apply_attributes(pair, &src, &dst, reporter)
}

fn apply_attributes(
    pair: &SyncPair,
    src: &PathEntry,
    dst: &PathEntry,
    reporter: &mut dyn Reporter,
) -> Result<(), EngineError> {
    if src.mtime != dst.mtime {
        reporter.report(&ChangeEvent::new(&pair.dest, ChangeKind::TimestampChanged));
        filetime::set_file_times(&pair.dest, src.atime, src.mtime)
            .map_err(|e| io_err(&pair.dest, e))?;
    }

    if src.mode != dst.mode {
        reporter.report(&ChangeEvent::new(&pair.dest, ChangeKind::PermissionChanged));
        set_mode(&pair.dest, src.mode)?;
    }

    Ok(())
}

fn require(pair: &SyncPair, entry: Option<PathEntry>) -> Result<PathEntry, EngineError> {
    entry.ok_or_else(|| EngineError::MissingCounterpart {
        src: pair.source.clone(),
        dest: pair.dest.clone(),
    })
}

fn list_names(path: &Path) -> Result<Vec<std::ffi::OsString>, EngineError> {
    let entries = fs::read_dir(path).map_err(|e| io_err(path, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(path, e))?;
        names.push(entry.file_name());
    }
    names.sort();
    Ok(names)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), EngineError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), EngineError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use filetime::FileTime;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn equalizes_timestamps_and_reports_t() {
        let src = TempDir::new().expect("src");
        let dst = TempDir::new().expect("dst");
        fs::write(src.path().join("a.txt"), b"x").expect("write");
        fs::write(dst.path().join("a.txt"), b"x").expect("write");
        filetime::set_file_mtime(src.path().join("a.txt"), FileTime::from_unix_time(900_000, 0))
            .expect("set mtime");

        let mut events = Vec::new();
        propagate(
            &SyncPair::new(src.path(), dst.path()),
            &mut events,
        )
        .expect("propagate");

        let src_entry = probe(&src.path().join("a.txt")).expect("probe").expect("entry");
        let dst_entry = probe(&dst.path().join("a.txt")).expect("probe").expect("entry");
        assert_eq!(src_entry.mtime, dst_entry.mtime);
        assert!(events
            .iter()
            .any(|e| e.kind == ChangeKind::TimestampChanged && e.path.ends_with("a.txt")));
    }

    #[test]
    #[cfg(unix)]
    fn equalizes_mode_bits_and_reports_p() {
        use std::os::unix::fs::PermissionsExt;

        let src = TempDir::new().expect("src");
        let dst = TempDir::new().expect("dst");
        fs::write(src.path().join("a.txt"), b"x").expect("write");
        fs::write(dst.path().join("a.txt"), b"x").expect("write");
        fs::set_permissions(src.path().join("a.txt"), fs::Permissions::from_mode(0o640))
            .expect("chmod src");
        fs::set_permissions(dst.path().join("a.txt"), fs::Permissions::from_mode(0o664))
            .expect("chmod dst");

        let mut events = Vec::new();
        propagate(&SyncPair::new(src.path(), dst.path()), &mut events).expect("propagate");

        let mode = fs::metadata(dst.path().join("a.txt"))
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o640);
        assert!(events
            .iter()
            .any(|e| e.kind == ChangeKind::PermissionChanged && e.path.ends_with("a.txt")));
    }

    #[test]
    fn missing_destination_side_is_fatal() {
        let src = TempDir::new().expect("src");
        let dst = TempDir::new().expect("dst");
        fs::write(src.path().join("only-here.txt"), b"x").expect("write");

        let mut events = Vec::new();
        let err = propagate(&SyncPair::new(src.path(), dst.path()), &mut events)
            .expect_err("missing counterpart");
        assert!(matches!(err, EngineError::MissingCounterpart { .. }));
    }

    #[test]
    fn aligned_trees_emit_nothing() {
        let src = TempDir::new().expect("src");
        let dst = TempDir::new().expect("dst");
        fs::write(src.path().join("a.txt"), b"x").expect("write");
        fs::write(dst.path().join("a.txt"), b"x").expect("write");

        let mut events = Vec::new();
        propagate(&SyncPair::new(src.path(), dst.path()), &mut events).expect("first");
        events.clear();
        propagate(&SyncPair::new(src.path(), dst.path()), &mut events).expect("second");
        assert!(events.is_empty(), "second pass must be a no-op: {events:?}");
    }
}
