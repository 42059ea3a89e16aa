//! Core authentication types

use serde::{Deserialize, Serialize};

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (the username that logged in)
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds)
    pub exp: i64,
}

/// A freshly signed access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact JWT (`header.payload.signature`)
    pub token: String,
    /// Issued at (Unix seconds)
    pub issued_at: i64,
    /// Expires at (Unix seconds)
    pub expires_at: i64,
}

impl IssuedToken {
    /// Seconds left before expiry, zero once expired
    pub fn expires_in(&self, now: i64) -> i64 {
        (self.expires_at - now).max(0)
    }
}

/// Identity admitted by the auth gate, attached to request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedSubject {
    pub subject: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<TokenClaims> for AuthenticatedSubject {
    fn from(claims: TokenClaims) -> Self {
        Self {
            subject: claims.sub,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}

impl std::fmt::Display for AuthenticatedSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.subject)
    }
}
