// Central Error Type for the Application

use crate::domain::{DomainError, ElementNotFound};
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// `<kind> <id> not found`, wrapped as a domain error
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        AppError::Domain(DomainError::ElementNotFound(ElementNotFound::element(
            kind, id,
        )))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Domain(DomainError::ElementNotFound(_)))
    }
}

impl From<ElementNotFound> for AppError {
    fn from(err: ElementNotFound) -> Self {
        AppError::Domain(DomainError::ElementNotFound(err))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx / lapin / jsonwebtoken errors are converted inside their
// adapter crates (orphan rule keeps those impls out of core)

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_helper() {
        let err = AppError::not_found("Task", "t-1");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Domain error: Task t-1 not found");
    }

    #[test]
    fn test_other_errors_are_not_not_found() {
        assert!(!AppError::Conflict("dup".into()).is_not_found());
        assert!(!AppError::Domain(DomainError::Validation("x".into())).is_not_found());
    }
}
