//! Error types for treesync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from metadata probing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying stat failure other than "not found", with annotated path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
