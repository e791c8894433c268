//! Domain types for the treesync engine.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem
//! paths. Pairs are built by joining a shared child name onto both sides, so
//! no path buffer is ever reused across recursive calls.

use std::ffi::OsStr;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use filetime::FileTime;

// ---------------------------------------------------------------------------
// Entry metadata
// ---------------------------------------------------------------------------

/// What a probed path turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Snapshot of one path's metadata, derived on demand by the prober and
/// discarded at the end of the pass. Never cached across passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathEntry {
    pub kind: EntryKind,
    /// Byte length; only meaningful for files.
    pub size: u64,
    /// Permission and type bits as reported by the filesystem.
    pub mode: u32,
    pub mtime: FileTime,
    pub atime: FileTime,
}

impl PathEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

// ---------------------------------------------------------------------------
// Sync pair
// ---------------------------------------------------------------------------

/// An ordered pair of corresponding locations in the two trees.
///
/// Invariant: both paths always sit at the same relative position in their
/// respective trees — [`SyncPair::child`] is the only way pairs grow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPair {
    pub source: PathBuf,
    pub dest: PathBuf,
}

impl SyncPair {
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }

    /// Join the same child name onto both sides.
    pub fn child(&self, name: &OsStr) -> SyncPair {
        SyncPair {
            source: self.source.join(name),
            dest: self.dest.join(name),
        }
    }
}

// ---------------------------------------------------------------------------
// Change events
// ---------------------------------------------------------------------------

/// The kind of mutating action a pass performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Deleted,
    Updated,
    TimestampChanged,
    PermissionChanged,
}

impl ChangeKind {
    /// Single-character report code.
    pub fn code(&self) -> char {
        match self {
            ChangeKind::Created => '+',
            ChangeKind::Deleted => '-',
            ChangeKind::Updated => 'o',
            ChangeKind::TimestampChanged => 't',
            ChangeKind::PermissionChanged => 'p',
        }
    }
}

/// One mutating action, reported immediately and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Destination-side path the action applied to.
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.code(), self.path.display())
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How file-level differences are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Source is authoritative; destination is overwritten.
    #[default]
    OneWay,
    /// Per file, the side with the newer mtime wins. Equal mtimes tie and
    /// nothing is copied.
    Bidirectional,
}

/// Immutable run configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub direction: Direction,
    /// Re-run period; `None` means run once and exit.
    pub interval: Option<Duration>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
