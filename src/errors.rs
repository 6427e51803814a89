//! Crate-wide error aggregation.
//!
//! Each subsystem owns its own error enum (`RegistryError`, `CheckpointError`,
//! `ExecutorError`) following a per-module error style. This top-level error
//! exists only for the CLI driver, which needs one `Result` type to bubble
//! fatal errors up to `main`.

use thiserror::Error;

use crate::checkpoint::CheckpointError;
use crate::executor::ExecutorError;
use crate::registry::RegistryError;

/// Top-level error for the reference CLI driver.
#[derive(Debug, Error)]
pub enum CasebenchError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CasebenchResult<T> = Result<T, CasebenchError>;
