//! API error handling
//!
//! Every component error is turned into an HTTP status and a `{message}` body
//! here. Token failures all collapse to the same 403.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use minibank_auth::{AuthError, ErrorResponse, LoginError, LoginFailure};
use minibank_ledger::LedgerError;
use thiserror::Error;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Login(#[from] LoginError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(_) => StatusCode::FORBIDDEN,
            Self::Login(_) => StatusCode::UNAUTHORIZED,
            Self::Ledger(LedgerError::InvalidAmount(_))
            | Self::Ledger(LedgerError::InsufficientFunds { .. }) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show clients
    pub fn client_message(&self) -> String {
        match self {
            Self::Auth(e) => e.client_message().to_string(),
            Self::Login(e) => e.to_string(),
            Self::Ledger(e) => e.to_string(),
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

impl From<LoginFailure> for ApiError {
    fn from(err: LoginFailure) -> Self {
        match err {
            LoginFailure::Rejected(e) => Self::Login(e),
            LoginFailure::Issue(e) => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            message: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}
