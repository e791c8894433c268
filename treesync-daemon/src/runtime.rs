//! Scheduler runtime: a ticker task plus a ctrl-c handler.
//!
//! Each tick is synchronous: the full reconciliation + propagation pass
//! runs to completion on a blocking task before the next tick becomes
//! eligible. A pass that overruns the period delays the next tick; ticks
//! are never skipped and never overlap. A cooperative loop on a timer
//! primitive replaces the usual interval-signal approach, so no re-entrant
//! handler ever calls into the sync logic.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};

use treesync_core::types::SyncConfig;
use treesync_engine::{pipeline, ConsoleReporter};

use crate::error::{io_err, DaemonError};

/// Fixed re-scan period for interval mode. Compiled in; not a runtime flag.
pub const SYNC_INTERVAL: Duration = Duration::from_secs(5);

/// Start the scheduler and block the current thread until it exits.
pub fn start_blocking(config: &SyncConfig) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config.clone()))
}

/// Run the scheduler until ctrl-c or a fatal pass error.
///
/// A fatal error within one tick aborts the whole process rather than
/// waiting for the next tick: the error taxonomy assumes nothing is
/// transient within a pass, and a tree that cannot be scanned now will not
/// become scannable by ignoring the failure.
pub async fn run(config: SyncConfig) -> Result<(), DaemonError> {
    let period = config.interval.unwrap_or(SYNC_INTERVAL);
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let scheduler_handle = {
        let shutdown = shutdown_tx.clone();
        let config = config.clone();
        tokio::spawn(async move {
            let result = scheduler_task(config, period, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, stopping scheduler");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Scheduler(format!(
                            "ctrl-c handler failed: {err}"
                        ))),
                    }
                }
            }
        })
    };

    let (scheduler_result, signal_result) = tokio::join!(scheduler_handle, signal_handle);
    handle_join("scheduler", scheduler_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

/// The tick loop. The first tick fires immediately, so startup behaves like
/// a one-shot run followed by the interval cadence.
async fn scheduler_task(
    config: SyncConfig,
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = ticker.tick() => {
                let tick_config = config.clone();
                let summary = tokio::task::spawn_blocking(move || {
                    let mut reporter = ConsoleReporter::default();
                    pipeline::run(&tick_config, &mut reporter)
                })
                .await
                .map_err(|err| DaemonError::Scheduler(format!("sync task join error: {err}")))??;

                tracing::info!(
                    created = summary.created,
                    updated = summary.updated,
                    deleted = summary.deleted,
                    timestamps = summary.timestamps,
                    permissions = summary.permissions,
                    duration_ms = summary.duration_ms,
                    "sync pass complete; waiting for next tick",
                );
            }
        }
    }

    Ok(())
}

fn handle_join(
    name: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(result) => result,
        Err(err) => Err(DaemonError::Scheduler(format!("{name} task panicked: {err}"))),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Instant;

    use tempfile::TempDir;
    use treesync_core::types::Direction;

    use super::*;

    fn test_config(src: &TempDir, dst: &TempDir) -> SyncConfig {
        SyncConfig {
            source: src.path().to_path_buf(),
            dest: dst.path().to_path_buf(),
            direction: Direction::OneWay,
            interval: Some(Duration::from_millis(50)),
        }
    }

    async fn wait_for(path: &std::path::Path, deadline: Duration) -> bool {
        let started = Instant::now();
        while started.elapsed() < deadline {
            if path.exists() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn ticks_pick_up_new_source_entries() {
        let src = TempDir::new().expect("src");
        let dst = TempDir::new().expect("dst");
        fs::write(src.path().join("first.txt"), b"one").expect("write");

        let (shutdown_tx, _) = broadcast::channel::<()>(4);
        let handle = tokio::spawn(scheduler_task(
            test_config(&src, &dst),
            Duration::from_millis(50),
            shutdown_tx.subscribe(),
        ));

        assert!(
            wait_for(&dst.path().join("first.txt"), Duration::from_secs(5)).await,
            "first tick should mirror the initial tree"
        );

        fs::write(src.path().join("second.txt"), b"two").expect("write");
        assert!(
            wait_for(&dst.path().join("second.txt"), Duration::from_secs(5)).await,
            "a later tick should pick up new entries"
        );

        shutdown_tx.send(()).expect("shutdown");
        handle.await.expect("join").expect("scheduler result");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn fatal_pass_error_stops_the_scheduler() {
        let dst = TempDir::new().expect("dst");
        let config = SyncConfig {
            source: "/nonexistent/treesync-src".into(),
            dest: dst.path().to_path_buf(),
            direction: Direction::OneWay,
            interval: Some(Duration::from_millis(50)),
        };

        let (shutdown_tx, _) = broadcast::channel::<()>(4);
        let result = scheduler_task(config, Duration::from_millis(50), shutdown_tx.subscribe())
            .await;
        assert!(result.is_err(), "bad source root must abort the scheduler");
    }
}
