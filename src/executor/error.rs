//! Executor error types.

use thiserror::Error;

use crate::checkpoint::CheckpointError;
use crate::registry::RegistryError;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A loaded shard's `configHash` disagrees with the experiment that
    /// started it, discovered during merge (worker-local mismatches are
    /// handled by clearing the shard, not by this variant).
    #[error("config hash mismatch across shards: expected '{expected}', found '{found}' in {path}")]
    ConfigMismatch {
        expected: String,
        found: String,
        path: String,
    },

    /// Same `runId` present in two different shards. Indicates a sharding
    /// bug; always fatal.
    #[error("run id '{0}' present in more than one checkpoint shard")]
    DuplicateRun(String),

    #[error("no SUT registered with id '{0}'")]
    SutNotFound(String),

    #[error("no case registered with id '{0}'")]
    CaseNotFound(String),

    #[error("failed to derive run id or config hash: {0}")]
    Hash(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
