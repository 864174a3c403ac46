// Domain Error Types

use std::error::Error as StdError;
use thiserror::Error;

type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// A requested domain element could not be located.
///
/// Carries a human-readable message and, optionally, the lower-level error
/// that led to the lookup failing (exposed through [`StdError::source`]).
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ElementNotFound {
    message: String,
    #[source]
    cause: Option<Cause>,
}

impl ElementNotFound {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(message: impl Into<String>, cause: impl Into<Cause>) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// Standard message for a missing entity: `"<kind> <id> not found"`
    pub fn element(kind: &str, id: impl std::fmt::Display) -> Self {
        Self::new(format!("{} {} not found", kind, id))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    ElementNotFound(#[from] ElementNotFound),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_not_found_message() {
        let err = ElementNotFound::element("Profile", "u-42");
        assert_eq!(err.to_string(), "Profile u-42 not found");
        assert_eq!(err.message(), "Profile u-42 not found");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_element_not_found_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "row vanished");
        let err = ElementNotFound::with_cause("Task t-9 not found", io);

        let source = err.source().expect("cause should be exposed");
        assert_eq!(source.to_string(), "row vanished");
    }

    #[test]
    fn test_domain_error_is_transparent_for_not_found() {
        let err: DomainError = ElementNotFound::new("gone").into();
        assert_eq!(err.to_string(), "gone");
    }
}
