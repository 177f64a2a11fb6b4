//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Error type returned by save handlers; opaque to the engine.
pub type SaveError = Box<dyn std::error::Error + Send + Sync>;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("save failed for tree {tree_id}")]
    Save {
        tree_id: String,
        #[source]
        source: SaveError,
    },

    #[error("tree not mounted: {0}")]
    UnknownTree(String),

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
