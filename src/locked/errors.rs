use crate::storage::store::StoreError;
use thiserror::Error;

/// Coarse classification callers map onto their own responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    Internal,
    NotFound,
    User,
}

/// Terminal failures of a locked map operation.
///
/// Lost compare-and-swap races never show up here; they are retried.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("internal error: {0}")]
    Internal(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    User(String),
}

impl MapError {
    pub fn error_type(&self) -> ErrorType {
        match self {
            MapError::Internal(_) => ErrorType::Internal,
            MapError::NotFound(_) => ErrorType::NotFound,
            MapError::User(_) => ErrorType::User,
        }
    }
}

impl From<StoreError> for MapError {
    fn from(e: StoreError) -> Self {
        MapError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for MapError {
    fn from(e: serde_json::Error) -> Self {
        MapError::Internal(format!("corrupt stored value: {}", e))
    }
}
