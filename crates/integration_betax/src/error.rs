//! Betax backend error types

use thiserror::Error;

/// Errors returned by the Betax client
#[derive(Debug, Error)]
pub enum BetaxError {
    /// The backend could not be reached
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request was sent but the response could not be read
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The response body was not the expected JSON
    #[error("Parse error: {0}")]
    ParseError(String),

    /// HTTP 404 or envelope status 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-200 status
    #[error("Unexpected status {status}: {}", .description.as_deref().unwrap_or("no description"))]
    UnexpectedStatus {
        /// HTTP or envelope status code
        status: u16,
        /// `description` field of the envelope, if any
        description: Option<String>,
    },

    /// A parameter could not be turned into a request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },
}

impl BetaxError {
    /// Returns true if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionFailed(_) | Self::RequestFailed(_) | Self::Timeout { .. } => true,
            Self::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(BetaxError::ConnectionFailed("refused".to_string()).is_retryable());
        assert!(BetaxError::RequestFailed("reset".to_string()).is_retryable());
        assert!(BetaxError::Timeout { timeout_secs: 10 }.is_retryable());
        assert!(
            BetaxError::UnexpectedStatus {
                status: 503,
                description: None
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!BetaxError::NotFound("voyageur".to_string()).is_retryable());
        assert!(!BetaxError::ParseError("eof".to_string()).is_retryable());
        assert!(!BetaxError::InvalidInput("nan".to_string()).is_retryable());
        assert!(
            !BetaxError::UnexpectedStatus {
                status: 400,
                description: Some("bad".to_string())
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_error_display() {
        let err = BetaxError::UnexpectedStatus {
            status: 500,
            description: Some("Erreur serveur".to_string()),
        };
        assert_eq!(err.to_string(), "Unexpected status 500: Erreur serveur");

        let err = BetaxError::UnexpectedStatus {
            status: 418,
            description: None,
        };
        assert!(err.to_string().contains("no description"));
    }
}
