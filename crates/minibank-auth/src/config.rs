//! Authentication configuration
//!
//! The signing key and the credential pair have no defaults: they must be
//! supplied by whoever starts the service.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::time::Duration;
use zeroize::Zeroize;

/// Default access token lifetime
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Minimum recommended signing key length for HS256 (256 bits)
pub const RECOMMENDED_KEY_LENGTH: usize = 32;

/// Secret used to sign and verify access tokens
///
/// Never printed; the backing buffer is wiped on drop.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey([REDACTED; {}])", self.0.len())
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl From<&str> for SigningKey {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for SigningKey {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl<'de> Deserialize<'de> for SigningKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SigningKey::from)
    }
}

/// Main authentication configuration
///
/// Deserialized directly from the `[auth]` section of the server
/// configuration. Missing secrets deserialize as empty and are caught by
/// [`AuthConfig::validate`].
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret for HMAC token signatures
    #[serde(default)]
    pub signing_key: SigningKey,
    /// The single accepted username
    #[serde(default)]
    pub username: String,
    /// The single accepted password
    #[serde(default)]
    pub password: String,
    /// Access token lifetime (`"15m"`, `"1h"`, ...)
    #[serde(with = "humantime_serde", default = "default_token_ttl")]
    pub token_ttl: Duration,
}

fn default_token_ttl() -> Duration {
    DEFAULT_TOKEN_TTL
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(SigningKey::default(), String::new(), String::new())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_key", &self.signing_key)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl AuthConfig {
    /// Build a configuration with the default token lifetime
    pub fn new(
        signing_key: impl Into<SigningKey>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            signing_key: signing_key.into(),
            username: username.into(),
            password: password.into(),
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Override the token lifetime
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.signing_key.is_empty() {
            errors.push("Signing key must be set".to_string());
        }
        if self.username.is_empty() {
            errors.push("Username must be set".to_string());
        }
        if self.password.is_empty() {
            errors.push("Password must be set".to_string());
        }
        if self.token_ttl.is_zero() {
            errors.push("Token lifetime must be greater than zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Whether the signing key is shorter than recommended for HS256
    pub fn has_weak_key(&self) -> bool {
        self.signing_key.len() < RECOMMENDED_KEY_LENGTH
    }
}
