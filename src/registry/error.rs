//! Registry error types.

use thiserror::Error;

/// Errors raised by `SutRegistry` and `CaseRegistry`.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// `register` called with an id already present.
    #[error("duplicate registration for id '{0}'")]
    DuplicateRegistration(String),

    /// `get_or_throw`/`create` called with an unknown id.
    #[error("no entry registered for id '{0}'")]
    NotFound(String),

    /// A case's `get_input` factory failed to load its resource.
    #[error("failed to load case input for '{case_id}': {message}")]
    ResourceLoadFailed { case_id: String, message: String },
}
