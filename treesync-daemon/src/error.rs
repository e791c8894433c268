use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the scheduler runtime.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sync error: {0}")]
    Engine(#[from] treesync_engine::EngineError),

    #[error("scheduler error: {0}")]
    Scheduler(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
