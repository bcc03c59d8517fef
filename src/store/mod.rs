//! Persisted storage for the latest analysis result.
//!
//! This module provides the storage backends and the result store that
//! keeps exactly one analysis document under a well-known key.

pub mod result_store;
pub mod storage;

pub use result_store::{PutOutcome, ResultStore};
pub use storage::{FileStorage, MemoryStorage, Storage};

use std::path::PathBuf;

/// Errors raised while writing to storage.
///
/// Reads never surface these: an unreadable slot is reported as absent.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be serialized.
    #[error("failed to serialize stored value: {0}")]
    Serialize(#[from] serde_json::Error),
}
