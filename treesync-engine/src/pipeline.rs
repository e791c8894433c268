//! Shared sync pipeline entrypoint used by CLI and daemon.
//!
//! A run is two passes over the same root pair: reconciliation (create /
//! update / delete until the destination's structure and content match the
//! source) followed by attribute propagation (mode bits and timestamps on
//! every matched pair, roots included).

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use treesync_core::probe::probe;
use treesync_core::types::{ChangeEvent, ChangeKind, SyncConfig, SyncPair};

use crate::error::EngineError;
use crate::propagator;
use crate::reconciler;
use crate::reporter::Reporter;

/// Outcome of one full reconciliation-plus-propagation pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub timestamps: usize,
    pub permissions: usize,
    pub duration_ms: u128,
    pub completed_at: DateTime<Utc>,
}

impl SyncSummary {
    pub fn total_changes(&self) -> usize {
        self.created + self.updated + self.deleted + self.timestamps + self.permissions
    }
}

/// Run one full pass for `config`, streaming events through `reporter`.
///
/// This is the canonical entrypoint for both `treesync` one-shot runs and
/// the interval scheduler.
pub fn run(config: &SyncConfig, reporter: &mut dyn Reporter) -> Result<SyncSummary, EngineError> {
    let started = Instant::now();

    ensure_directory(&config.source)?;
    ensure_directory(&config.dest)?;

    let pair = SyncPair::new(&config.source, &config.dest);
    let mut counting = CountingReporter::new(reporter);
    reconciler::reconcile(&pair, config.direction, &mut counting)?;
    propagator::propagate(&pair, &mut counting)?;

    Ok(counting.into_summary(started.elapsed()))
}

fn ensure_directory(path: &Path) -> Result<(), EngineError> {
    match probe(path)? {
        Some(entry) if entry.is_dir() => Ok(()),
        _ => Err(EngineError::NotADirectory {
            path: path.to_path_buf(),
        }),
    }
}

/// Forwards events to the caller's reporter while tallying them.
struct CountingReporter<'a> {
    inner: &'a mut dyn Reporter,
    created: usize,
    updated: usize,
    deleted: usize,
    timestamps: usize,
    permissions: usize,
}

impl<'a> CountingReporter<'a> {
    fn new(inner: &'a mut dyn Reporter) -> Self {
        Self {
            inner,
            created: 0,
            updated: 0,
            deleted: 0,
            timestamps: 0,
            permissions: 0,
        }
    }

    fn into_summary(self, duration: Duration) -> SyncSummary {
        SyncSummary {
            created: self.created,
            updated: self.updated,
            deleted: self.deleted,
            timestamps: self.timestamps,
            permissions: self.permissions,
            duration_ms: duration.as_millis(),
            completed_at: Utc::now(),
        }
    }
}

impl Reporter for CountingReporter<'_> {
    fn report(&mut self, event: &ChangeEvent) {
        match event.kind {
            ChangeKind::Created => self.created += 1,
            ChangeKind::Updated => self.updated += 1,
            ChangeKind::Deleted => self.deleted += 1,
            ChangeKind::TimestampChanged => self.timestamps += 1,
            ChangeKind::PermissionChanged => self.permissions += 1,
        }
        self.inner.report(event);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
