//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (HTTP, database, storage).

use thiserror::Error;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("{0}")]
    Validation(String),

    /// Entity not found
    #[error("{0} not found")]
    NotFound(String),

    /// Operation conflicts with the entity's current state
    #[error("{0}")]
    Conflict(String),

    /// A per-entity quota has been reached
    #[error("{0}")]
    LimitExceeded(String),

    /// Stored data could not be interpreted
    #[error("Malformed {entity}: {reason}")]
    Malformed { entity: String, reason: String },
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        DomainError::Conflict(msg.into())
    }

    /// Create a limit error
    pub fn limit_exceeded(msg: impl Into<String>) -> Self {
        DomainError::LimitExceeded(msg.into())
    }

    /// Create a malformed data error
    pub fn malformed(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        DomainError::Malformed {
            entity: entity.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
