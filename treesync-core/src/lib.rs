//! Treesync core library — domain types, metadata probing, errors.
//!
//! Public API surface:
//! - [`types`] — entry metadata, sync pairs, change events, configuration
//! - [`error`] — [`CoreError`]
//! - [`probe`] — filesystem metadata prober

pub mod error;
pub mod probe;
pub mod types;

pub use error::CoreError;
pub use types::{
    ChangeEvent, ChangeKind, Direction, EntryKind, PathEntry, SyncConfig, SyncPair,
};
