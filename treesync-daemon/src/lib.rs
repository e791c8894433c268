//! Interval scheduler: re-runs the full sync pass on a fixed period.

mod error;
mod runtime;

pub use error::DaemonError;
pub use runtime::{run, start_blocking, SYNC_INTERVAL};
