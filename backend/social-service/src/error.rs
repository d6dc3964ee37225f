/// Error types for social-service
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable machine-readable code for the outer transport layer
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "BAD_REQUEST",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Forbidden(_) => "FORBIDDEN",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::Database(_) | ServiceError::Internal(_) => "INTERNAL",
        }
    }

    /// True when the caller sent something that will never succeed as-is
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::BadRequest(_)
                | ServiceError::NotFound(_)
                | ServiceError::Forbidden(_)
                | ServiceError::Conflict(_)
        )
    }

    /// Check if the underlying database error is a unique constraint violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            ServiceError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }

    /// Check if the underlying database error is a foreign key violation
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            ServiceError::Database(sqlx::Error::Database(db_err)) => {
                db_err.is_foreign_key_violation()
            }
            _ => false,
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
