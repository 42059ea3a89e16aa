//! Credential store
//!
//! Holds the single accepted username/password pair for the lifetime of the
//! process.

use subtle::ConstantTimeEq;

use crate::config::AuthConfig;
use crate::error::LoginError;

/// The fixed credential pair
#[derive(Clone)]
pub struct CredentialStore {
    username: String,
    password: String,
}

impl CredentialStore {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }

    /// Exact match on both fields
    ///
    /// Both comparisons always run so a wrong username and a wrong password
    /// take the same time.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok = constant_time_compare(username, &self.username);
        let pass_ok = constant_time_compare(password, &self.password);
        user_ok & pass_ok
    }

    /// Same as [`verify`](Self::verify), as a `Result` for handlers
    pub fn check(&self, username: &str, password: &str) -> Result<(), LoginError> {
        if self.verify(username, password) {
            Ok(())
        } else {
            Err(LoginError::BadCredentials)
        }
    }

    /// Subject to put in tokens issued for this store
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    // Length is not secret; ct_eq on unequal lengths returns false
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::new("user", "password123")
    }

    #[test]
    fn test_verify_exact_match() {
        assert!(store().verify("user", "password123"));
        assert!(store().check("user", "password123").is_ok());
    }

    #[test]
    fn test_verify_rejects_mismatch() {
        let store = store();
        assert!(!store.verify("user", "password124"));
        assert!(!store.verify("User", "password123"));
        assert!(!store.verify("user", "password1234"));
        assert!(!store.verify("", ""));
        assert!(!store.verify("user", ""));
        assert_eq!(
            store.check("admin", "password123"),
            Err(LoginError::BadCredentials)
        );
    }

    #[test]
    fn test_from_config() {
        let config = AuthConfig::new("secret", "alice", "hunter2");
        let store = CredentialStore::from_config(&config);
        assert!(store.verify("alice", "hunter2"));
        assert_eq!(store.username(), "alice");
    }

    #[test]
    fn test_debug_hides_password() {
        let printed = format!("{:?}", store());
        assert!(!printed.contains("password123"));
    }
}
