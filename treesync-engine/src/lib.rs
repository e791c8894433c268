//! # treesync-engine
//!
//! Tree reconciliation and attribute propagation.
//!
//! Call [`pipeline::run`] to align a destination tree with a source tree:
//! one reconciliation pass (create / update / delete) followed by one
//! propagation pass (mode bits and timestamps). Both trees are re-scanned
//! from scratch on every run; nothing is cached between passes.

pub mod copier;
pub mod deleter;
pub mod error;
pub mod pipeline;
pub mod propagator;
pub mod reconciler;
pub mod reporter;

pub use error::EngineError;
pub use pipeline::SyncSummary;
pub use reporter::{ConsoleReporter, Reporter};
