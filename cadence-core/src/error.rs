use std::time::Duration;

use thiserror::Error;

use crate::storage::StorageError;

/// Error taxonomy surfaced by every core service.
///
/// Lower layers (SQL, blob backends, JWT, password hashing) are translated
/// into one of these variants at the boundary; nothing in the core retries.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    Conflict,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("storage error: {0}")]
    StorageIo(#[from] StorageError),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => CoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                CoreError::Conflict
            }
            other => CoreError::Internal(other.to_string()),
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
