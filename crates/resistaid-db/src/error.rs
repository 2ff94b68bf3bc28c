//! Vector store error types.

use resistaid_common::ResistaidError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    InvalidEmbeddingDimension { expected: usize, actual: usize },

    #[error("Arrow error: {0}")]
    Arrow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

#[cfg(feature = "lance")]
impl From<lancedb::Error> for DbError {
    fn from(err: lancedb::Error) -> Self {
        DbError::StoreUnavailable(err.to_string())
    }
}

#[cfg(feature = "lance")]
impl From<arrow_schema::ArrowError> for DbError {
    fn from(err: arrow_schema::ArrowError) -> Self {
        DbError::Arrow(err.to_string())
    }
}

impl From<DbError> for ResistaidError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::StoreUnavailable(msg) => ResistaidError::StoreUnavailable(msg),
            DbError::CollectionNotFound(name) => ResistaidError::CollectionNotFound(name),
            DbError::Io(e) => ResistaidError::StoreUnavailable(e.to_string()),
            DbError::Serialization(e) => ResistaidError::Serialization(e),
            other => ResistaidError::Other(anyhow::Error::new(other)),
        }
    }
}

