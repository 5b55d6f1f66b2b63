//! Declaration and engine error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource already declared: {0}")]
    DuplicateResource(String),

    #[error("Resource '{resource}' depends on '{dependency}', which is not declared before it")]
    UnknownDependency {
        resource: String,
        dependency: String,
    },

    #[error("Output '{0}' is not available in the engine state yet")]
    UnresolvedOutput(String),

    #[error("Invalid output reference: {0}")]
    InvalidOutputRef(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
