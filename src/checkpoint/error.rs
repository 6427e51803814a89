//! Checkpoint store error types, following `storage::error::StorageError`'s
//! `thiserror`-derived shape.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Shard file unparseable or violates its invariants.
    #[error("checkpoint shard at '{path}' is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    /// Loaded shard's `configHash` disagrees with the current experiment.
    #[error("checkpoint shard config hash '{found}' does not match expected '{expected}'")]
    Incompatible { expected: String, found: String },
}

pub type CheckpointResult<T> = Result<T, CheckpointError>;
