//! Tree reconciler — classifies every child as create / update / delete /
//! unchanged and recurses into matching subdirectories.
//!
//! One pass walks a pair of trees depth-first. For each source child the
//! destination side is probed and the pair is created, updated, or left
//! alone; a second scan of the destination then removes entries with no
//! source counterpart. Everything is decided from fresh probes — no state
//! survives between passes.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

use treesync_core::probe::probe;
use treesync_core::types::{ChangeEvent, ChangeKind, Direction, EntryKind, PathEntry, SyncPair};

use crate::copier;
use crate::deleter;
use crate::error::{io_err, EngineError};
use crate::reporter::Reporter;

/// Reconcile one directory pair, depth-first.
///
/// Both `pair.source` and `pair.dest` must be existing directories; failing
/// to enumerate either side aborts the whole run, since a half-seen tree
/// cannot be safely reconciled.
pub fn reconcile(
    pair: &SyncPair,
    direction: Direction,
    reporter: &mut dyn Reporter,
) -> Result<(), EngineError> {
    let source_names = list_names(&pair.source)?;

    for name in &source_names {
        let child = pair.child(name);
        let Some(src) = probe(&child.source)? else {
            // Raced with an external delete; the next pass re-scans.
            tracing::warn!("source entry vanished during scan: {}", child.source.display());
            continue;
        };

        match probe(&child.dest)? {
            None => create_missing(&child, &src, direction, reporter)?,
            Some(dst) => match (src.kind, dst.kind) {
                (EntryKind::Directory, EntryKind::Directory) => {
                    reconcile(&child, direction, reporter)?;
                }
                (EntryKind::File, EntryKind::File) => {
                    reconcile_files(&child, &src, &dst, direction, reporter)?;
                }
                _ => {
                    return Err(EngineError::KindConflict {
                        src: child.source,
                        dest: child.dest,
                    });
                }
            },
        }
    }

    let known: HashSet<&OsString> = source_names.iter().collect();
    for name in list_names(&pair.dest)? {
        if known.contains(&name) {
            continue;
        }
        remove_extraneous(&pair.child(&name), reporter)?;
    }

    Ok(())
}

/// Source child has no destination counterpart: create it.
fn create_missing(
    pair: &SyncPair,
    src: &PathEntry,
    direction: Direction,
    reporter: &mut dyn Reporter,
) -> Result<(), EngineError> {
    match src.kind {
        EntryKind::Directory => {
            // Mode bits are inherited at creation time; fine-grained
            // propagation happens in the second pass.
            create_dir_with_mode(&pair.dest, src.mode)?;
            reporter.report(&ChangeEvent::new(&pair.dest, ChangeKind::Created));
            reconcile(pair, direction, reporter)
        }
        EntryKind::File => {
            copier::copy_entry(&pair.source, &pair.dest)?;
            reporter.report(&ChangeEvent::new(&pair.dest, ChangeKind::Created));
            Ok(())
        }
    }
}

/// Both sides are files: decide whether and in which direction to copy.
fn reconcile_files(
    pair: &SyncPair,
    src: &PathEntry,
    dst: &PathEntry,
    direction: Direction,
    reporter: &mut dyn Reporter,
) -> Result<(), EngineError> {
    match direction {
        Direction::OneWay => {
            // Equal size and equal mtime is the only "unchanged" verdict.
            // This is a proxy for content equality, not a guarantee.
            if src.size != dst.size || src.mtime != dst.mtime {
                copier::copy_entry(&pair.source, &pair.dest)?;
                reporter.report(&ChangeEvent::new(&pair.dest, ChangeKind::Updated));
            }
        }
        Direction::Bidirectional => {
            // Newer mtime wins in either direction; a tie means no action.
            // The report line names the destination-side path regardless of
            // which way the bytes flowed.
            if src.mtime > dst.mtime {
                copier::copy_entry(&pair.source, &pair.dest)?;
                reporter.report(&ChangeEvent::new(&pair.dest, ChangeKind::Updated));
            } else if dst.mtime > src.mtime {
                copier::copy_entry(&pair.dest, &pair.source)?;
                reporter.report(&ChangeEvent::new(&pair.dest, ChangeKind::Updated));
            }
        }
    }
    Ok(())
}

/// Destination child has no source counterpart: remove it.
fn remove_extraneous(pair: &SyncPair, reporter: &mut dyn Reporter) -> Result<(), EngineError> {
    let Some(dst) = probe(&pair.dest)? else {
        return Ok(());
    };

    match dst.kind {
        EntryKind::Directory => {
            if deleter::delete_tree(&pair.dest)? {
                reporter.report(&ChangeEvent::new(&pair.dest, ChangeKind::Deleted));
            } else {
                tracing::warn!("partially removed: {}", pair.dest.display());
            }
        }
        EntryKind::File => match fs::remove_file(&pair.dest) {
            Ok(()) => reporter.report(&ChangeEvent::new(&pair.dest, ChangeKind::Deleted)),
            Err(err) => {
                tracing::warn!("could not remove {}: {err}", pair.dest.display());
            }
        },
    }
    Ok(())
}

/// List a directory's child names, sorted so report output is deterministic.
fn list_names(path: &Path) -> Result<Vec<OsString>, EngineError> {
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
fn create_dir_with_mode(path: &Path, mode: u32) -> Result<(), EngineError> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new()
        .mode(mode)
        .create(path)
        .map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn create_dir_with_mode(path: &Path, _mode: u32) -> Result<(), EngineError> {
    fs::create_dir(path).map_err(|e| io_err(path, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
