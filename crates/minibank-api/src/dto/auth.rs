//! Authentication DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Login request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Read `username` and `password`; non-string fields count as absent
    pub fn from_body(body: &Value) -> Self {
        let field = |name: &str| body.get(name).and_then(Value::as_str).map(String::from);
        Self {
            username: field("username"),
            password: field("password"),
        }
    }
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Access token
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_request_from_body() {
        let request = LoginRequest::from_body(&json!({"username": "user", "password": "password123"}));
        assert_eq!(request.username.as_deref(), Some("user"));
        assert_eq!(request.password.as_deref(), Some("password123"));
    }

    #[test]
    fn test_login_request_wrong_types() {
        let request = LoginRequest::from_body(&json!({"username": 42, "password": ["x"]}));
        assert_eq!(request, LoginRequest::default());

        let request = LoginRequest::from_body(&json!("user"));
        assert_eq!(request, LoginRequest::default());
    }
}
