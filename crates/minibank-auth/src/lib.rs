//! minibank Authentication Layer
//!
//! - **Credential store**: the single accepted username/password pair,
//!   compared in constant time
//! - **Token service**: stateless HS256 access tokens with a fixed lifetime
//! - **Auth gate**: tower layer that admits `Authorization: Bearer <token>`
//!   requests and refuses everything else with one uniform 403
//!
//! # Architecture
//!
//! ```text
//! POST /login ──► CredentialStore::verify ──► TokenService::issue ──► {token}
//!
//! Request ──► AuthLayer ──► TokenService::verify ──► Handler (RequireAuth)
//!                 │
//!                 └── any AuthError ──► 403 "Invalid or expired token"
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod middleware;
pub mod token;
pub mod types;

pub use config::{AuthConfig, SigningKey};
pub use credentials::CredentialStore;
pub use error::{AuthError, AuthResult, ErrorResponse, LoginError};
pub use middleware::{authorize, AuthLayer, AuthMiddleware, RequireAuth};
pub use token::{TokenIssueError, TokenService};
pub use types::*;

use std::sync::Arc;
use thiserror::Error;

/// Failure of a login attempt
#[derive(Debug, Error)]
pub enum LoginFailure {
    #[error(transparent)]
    Rejected(#[from] LoginError),

    #[error(transparent)]
    Issue(#[from] TokenIssueError),
}

/// Main authentication service combining the credential store and tokens
#[derive(Clone)]
pub struct AuthService {
    pub credentials: CredentialStore,
    pub tokens: Arc<TokenService>,
}

impl AuthService {
    /// Create the auth service from a validated configuration
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            credentials: CredentialStore::from_config(config),
            tokens: Arc::new(TokenService::from_config(config)),
        }
    }

    /// Exchange a username/password pair for an access token
    pub fn login(&self, username: &str, password: &str) -> Result<IssuedToken, LoginFailure> {
        self.credentials.check(username, password)?;
        Ok(self.tokens.issue(username)?)
    }

    /// Create an auth layer for Axum router
    pub fn layer(&self) -> AuthLayer {
        AuthLayer::new(self.tokens.clone())
    }
}
