/// Unified error types for tg-whois
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum WhoisError {
    /// Identifier missing or empty after normalization
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Neither an account nor a chat matched
    #[error("Not found: {0}")]
    NotFound(String),

    /// Platform denied access to a chat or channel
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A platform lookup exceeded its budget
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Any other platform-reported error
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Rate limiting errors
    #[error("Rate limit exceeded")]
    RateLimitExceeded { retry_after: std::time::Duration },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl WhoisError {
    /// HTTP status and stable error code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            WhoisError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "InvalidInput"),
            WhoisError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            WhoisError::PermissionDenied(_) => (StatusCode::FORBIDDEN, "PermissionDenied"),
            WhoisError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "Timeout"),
            WhoisError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UpstreamFailure"),
            WhoisError::RateLimitExceeded { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, "RateLimitExceeded")
            }
            WhoisError::Config(_) | WhoisError::Internal(_) | WhoisError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError")
            }
        }
    }
}

/// Convert WhoisError to HTTP response
impl IntoResponse for WhoisError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let message = match &self {
            WhoisError::Config(_) | WhoisError::Internal(_) | WhoisError::Io(_) => {
                tracing::error!(error = %self, "Internal error");
                "Internal server error".to_string() // Don't leak details
            }
            WhoisError::Upstream(detail) => {
                tracing::error!(error = %detail, "Upstream failure");
                "Failed to fetch entity information".to_string()
            }
            WhoisError::RateLimitExceeded { .. } => "Rate limit exceeded".to_string(),
            _ => self.to_string(),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type WhoisResult<T> = Result<T, WhoisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (WhoisError::InvalidInput(String::new()), StatusCode::BAD_REQUEST),
            (WhoisError::NotFound(String::new()), StatusCode::NOT_FOUND),
            (WhoisError::PermissionDenied(String::new()), StatusCode::FORBIDDEN),
            (WhoisError::Timeout(String::new()), StatusCode::GATEWAY_TIMEOUT),
            (WhoisError::Upstream(String::new()), StatusCode::BAD_GATEWAY),
            (WhoisError::Internal(String::new()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_rate_limit_status() {
        let error = WhoisError::RateLimitExceeded {
            retry_after: std::time::Duration::from_secs(1),
        };
        assert_eq!(error.status_and_code().1, "RateLimitExceeded");
        assert_eq!(error.into_response().status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
