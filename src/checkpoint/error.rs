//! Checkpoint error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing or renaming a snapshot file failed
    #[error("Snapshot store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Machine ids become file names, so they are restricted
    #[error("Invalid machine id {id:?}: use letters, digits, '-', '_' or '.' and do not start with '.'")]
    InvalidMachineId { id: String },
}

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Checkpoint version is not supported by this version
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Snapshot does not fit the current table and trigger policy
    #[error("Invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
