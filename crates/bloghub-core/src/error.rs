//! Domain-level error types.

use thiserror::Error;

use crate::fetch::FetchError;
use crate::ports::CacheError;

/// Domain errors - business rule failures surfaced to callers.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Clone, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::NotFound {
                entity_type: "record",
                id: "unknown".to_string(),
            },
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            RepoError::Connection(msg) => DomainError::Unavailable(msg),
            RepoError::Query(msg) => DomainError::Internal(msg),
        }
    }
}

impl From<CacheError> for DomainError {
    fn from(err: CacheError) -> Self {
        DomainError::Internal(format!("local cache: {err}"))
    }
}

impl From<FetchError> for DomainError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotFound => DomainError::NotFound {
                entity_type: "post",
                id: "unknown".to_string(),
            },
            FetchError::Unavailable => DomainError::Unavailable("no tier configured".to_string()),
            other => DomainError::Unavailable(other.to_string()),
        }
    }
}
