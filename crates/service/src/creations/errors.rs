use std::time::Duration;

use thiserror::Error;

/// Failures reported by a `CreationRepository`. These stay inside the
/// service crate; the store folds them into `StoreError`/`LoadStatus`.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
    #[error("backing store rejected the write: {0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("backing store did not answer within {0:?}")]
    Timeout(Duration),
}

impl From<models::errors::ModelError> for RepositoryError {
    fn from(e: models::errors::ModelError) -> Self {
        use models::errors::ModelError;
        match e {
            ModelError::Validation(msg) => RepositoryError::Rejected(msg),
            ModelError::Db(msg) => RepositoryError::Unavailable(msg),
            e @ ModelError::MalformedRow { .. } => RepositoryError::Malformed(e.to_string()),
        }
    }
}

/// Errors surfaced to callers of `StagedStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("commit failed: {0}")]
    CommitFailed(String),
}

impl StoreError {
    /// Stable numeric code, sent as `code` in error response bodies
    pub fn code(&self) -> u16 {
        match self {
            StoreError::Validation(_) => 2001,
            StoreError::CommitFailed(_) => 2101,
        }
    }
}
