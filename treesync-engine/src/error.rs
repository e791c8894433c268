//! Error types for treesync-engine.

use std::path::PathBuf;

use thiserror::Error;

use treesync_core::error::CoreError;

/// All errors that can arise from reconciliation and propagation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A metadata probe failed.
    #[error("probe error: {0}")]
    Core(#[from] CoreError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The copier wrote a different byte count than the source holds.
    #[error("short copy to {path}: wrote {written} of {expected} bytes")]
    ShortCopy {
        path: PathBuf,
        expected: u64,
        written: u64,
    },

    /// A path is a file on one side and a directory on the other.
    #[error("kind conflict: {src} and {dest} are not both files or both directories")]
    KindConflict { src: PathBuf, dest: PathBuf },

    /// A pair lost one of its sides between reconciliation and propagation.
    #[error("missing counterpart for pair {src} / {dest} during propagation")]
    MissingCounterpart { src: PathBuf, dest: PathBuf },

    /// A sync root does not exist or is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

/// Convenience constructor for [`EngineError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> EngineError {
    EngineError::Io {
        path: path.into(),
        source,
    }
}
