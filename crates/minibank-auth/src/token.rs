//! Access token service
//!
//! Stateless HS256 tokens:
//! - payload is `{sub, iat, exp}`, lifetime fixed per process
//! - the server keeps no record of issued tokens
//! - the signature is checked before expiry, so a tampered token never
//!   reports `Expired`

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use thiserror::Error;

use crate::config::{AuthConfig, SigningKey};
use crate::error::{AuthError, AuthResult};
use crate::types::{AuthenticatedSubject, IssuedToken, TokenClaims};

/// Token encoding failed
#[derive(Debug, Error)]
#[error("Failed to encode access token: {0}")]
pub struct TokenIssueError(#[from] jsonwebtoken::errors::Error);

/// Issues and verifies signed access tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    /// Create a token service
    pub fn new(signing_key: &SigningKey, ttl: Duration) -> Self {
        let encoding_key = EncodingKey::from_secret(signing_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(signing_key.as_bytes());

        // Expiry is checked by hand against an injectable clock
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key,
            decoding_key,
            validation,
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.signing_key, config.token_ttl)
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs as u64)
    }

    /// Issue a token for `subject`, valid from now
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, TokenIssueError> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (Unix seconds)
    pub fn issue_at(&self, subject: &str, now: i64) -> Result<IssuedToken, TokenIssueError> {
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> AuthResult<AuthenticatedSubject> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token as if the current time were `now` (Unix seconds)
    pub fn verify_at(&self, token: &str, now: i64) -> AuthResult<AuthenticatedSubject> {
        let claims = self.decode_token(token)?;

        if now >= claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(claims.into())
    }

    /// Structure and signature check (HMAC comparison is constant time)
    fn decode_token(&self, token: &str) -> AuthResult<TokenClaims> {
        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn test_key() -> SigningKey {
        SigningKey::from("test-secret-key-for-jwt-tokens-min-32-bytes!")
    }

    fn service() -> TokenService {
        TokenService::new(&test_key(), Duration::from_secs(3600))
    }

    /// Flip the first character of the signature segment
    fn tamper_signature(token: &str) -> String {
        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        format!("{}.{}", head, chars.into_iter().collect::<String>())
    }

    #[test]
    fn test_issue_sets_expiry_one_ttl_ahead() {
        let issued = service().issue_at("user", NOW).unwrap();
        assert_eq!(issued.issued_at, NOW);
        assert_eq!(issued.expires_at, NOW + 3600);
        assert_eq!(issued.expires_in(NOW), 3600);
        assert_eq!(issued.token.split('.').count(), 3);
    }

    #[test]
    fn test_round_trip_before_expiry() {
        let service = service();
        let issued = service.issue_at("user", NOW).unwrap();

        let subject = service.verify_at(&issued.token, NOW + 10).unwrap();
        assert_eq!(subject.subject, "user");
        assert_eq!(subject.expires_at, NOW + 3600);

        let subject = service.verify_at(&issued.token, NOW + 3599).unwrap();
        assert_eq!(subject.subject, "user");
    }

    #[test]
    fn test_round_trip_with_wall_clock() {
        let service = service();
        let issued = service.issue("user").unwrap();
        assert_eq!(service.verify(&issued.token).unwrap().subject, "user");
    }

    #[test]
    fn test_expired_at_and_after_exp() {
        let service = service();
        let issued = service.issue_at("user", NOW).unwrap();

        assert_eq!(
            service.verify_at(&issued.token, NOW + 3600),
            Err(AuthError::Expired)
        );
        assert_eq!(
            service.verify_at(&issued.token, NOW + 7200),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn test_tampered_signature() {
        let service = service();
        let issued = service.issue_at("user", NOW).unwrap();
        let tampered = tamper_signature(&issued.token);

        assert_eq!(
            service.verify_at(&tampered, NOW + 1),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_tampered_expired_token_reports_signature() {
        let service = service();
        let issued = service.issue_at("user", NOW).unwrap();
        let tampered = tamper_signature(&issued.token);

        assert_eq!(
            service.verify_at(&tampered, NOW + 7200),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_swapped_payload() {
        let service = service();
        let user = service.issue_at("user", NOW).unwrap();
        let admin = service.issue_at("admin", NOW).unwrap();

        let user_parts: Vec<&str> = user.token.split('.').collect();
        let admin_parts: Vec<&str> = admin.token.split('.').collect();
        let forged = format!("{}.{}.{}", user_parts[0], admin_parts[1], user_parts[2]);

        assert_eq!(
            service.verify_at(&forged, NOW + 1),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_other_key_is_bad_signature() {
        let other = TokenService::new(
            &SigningKey::from("another-secret-key-that-is-32-bytes-long"),
            Duration::from_secs(3600),
        );
        let issued = other.issue_at("user", NOW).unwrap();

        assert_eq!(
            service().verify_at(&issued.token, NOW + 1),
            Err(AuthError::BadSignature)
        );
    }

    #[test]
    fn test_malformed_tokens() {
        let service = service();
        for token in ["", "garbage", "a.b", "not.a.token", "a.b.c.d"] {
            assert_eq!(
                service.verify_at(token, NOW),
                Err(AuthError::Malformed),
                "token {:?}",
                token
            );
        }
    }

    #[test]
    fn test_wrong_algorithm_is_malformed() {
        let key = test_key();
        let claims = TokenClaims {
            sub: "user".to_string(),
            iat: NOW,
            exp: NOW + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap();

        assert_eq!(service().verify_at(&token, NOW), Err(AuthError::Malformed));
    }

    #[test]
    fn test_ttl_accessor() {
        assert_eq!(service().ttl(), Duration::from_secs(3600));
    }
}
