//! Authentication error types
//!
//! Token failures keep their precise cause for logging and metrics, while the
//! message shown to clients is the same for all of them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Message returned to clients for every rejected token
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// Message returned to clients for a failed login
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Reasons a presented token is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential, or no `Bearer ` prefix
    #[error("Missing bearer token")]
    Missing,

    /// Token structure could not be decoded
    #[error("Malformed token")]
    Malformed,

    /// Signature does not match the payload
    #[error("Bad token signature")]
    BadSignature,

    /// Token lifetime has elapsed
    #[error("Token has expired")]
    Expired,
}

impl AuthError {
    /// HTTP status code for this error (always 403)
    pub fn status_code(&self) -> u16 {
        403
    }

    /// Stable label for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Malformed => "malformed",
            Self::BadSignature => "bad_signature",
            Self::Expired => "expired",
        }
    }

    /// Safe message for clients; identical for every variant
    pub fn client_message(&self) -> &'static str {
        INVALID_TOKEN_MESSAGE
    }
}

/// Login failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    BadCredentials,
}

impl LoginError {
    pub fn status_code(&self) -> u16 {
        401
    }
}

/// Error body for API clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub message: String,
}

impl From<&AuthError> for ErrorResponse {
    fn from(error: &AuthError) -> Self {
        Self {
            message: error.client_message().to_string(),
        }
    }
}

impl From<&LoginError> for ErrorResponse {
    fn from(error: &LoginError) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::InvalidSignature => Self::BadSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}
