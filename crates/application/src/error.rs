//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backend could not be reached or answered with an error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// The backend answered but the requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// No signed-in user, or the user may not do this
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// The device refused a permission (location)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Input rejected before reaching the backend
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ExternalService(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_external_failures_are_retryable() {
        assert!(ApplicationError::ExternalService("timeout".into()).is_retryable());
        assert!(!ApplicationError::NotFound("user".into()).is_retryable());
        assert!(!ApplicationError::InvalidInput("empty".into()).is_retryable());
    }

    #[test]
    fn domain_errors_convert_transparently() {
        let err: ApplicationError = DomainError::validation("origin must not be empty").into();
        assert_eq!(err.to_string(), "Validation failed: origin must not be empty");
    }
}
