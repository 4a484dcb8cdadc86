//! Repository error types and shared helpers

use tc_core::error::TcError;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for TcError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(message) => TcError::Database(message),
            RepositoryError::Database(e) => TcError::Database(e.to_string()),
            RepositoryError::Validation(message) => TcError::Internal(message),
            RepositoryError::Conflict(message) => TcError::state(message),
        }
    }
}

/// Map a raw SQLx error at a port boundary
pub(crate) fn db_err(error: sqlx::Error) -> TcError {
    TcError::Database(error.to_string())
}
