//! Bearer-token gate for Axum
//!
//! Wraps protected routes. Every request must carry
//! `Authorization: Bearer <token>`; anything else is refused with 403 and the
//! same message, whatever the cause. The cause is logged and counted.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::error::{AuthError, AuthResult, ErrorResponse};
use crate::token::TokenService;
use crate::types::AuthenticatedSubject;

/// Literal prefix of the `Authorization` header value
pub const BEARER_PREFIX: &str = "Bearer ";

/// Authentication middleware layer
#[derive(Clone)]
pub struct AuthLayer {
    tokens: Arc<TokenService>,
}

impl AuthLayer {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            tokens: self.tokens.clone(),
        }
    }
}

/// Authentication middleware service
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    tokens: Arc<TokenService>,
}

impl<S> Service<Request> for AuthMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let tokens = self.tokens.clone();
        // Take the service that was driven to readiness, leave a fresh clone
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match authenticate_request(req.headers(), &tokens) {
                Ok(subject) => {
                    tracing::debug!(subject = %subject, "Bearer token accepted");
                    let (mut parts, body) = req.into_parts();
                    parts.extensions.insert(subject);
                    inner.call(Request::from_parts(parts, body)).await
                }
                Err(e) => {
                    tracing::debug!(
                        reason = e.reason(),
                        method = %req.method(),
                        uri = %req.uri(),
                        "Bearer token rejected"
                    );
                    metrics::counter!("minibank_auth_rejections_total", "reason" => e.reason())
                        .increment(1);
                    Ok(auth_error_response(e))
                }
            }
        })
    }
}

/// Authenticate a request from its headers
fn authenticate_request(headers: &HeaderMap, tokens: &TokenService) -> AuthResult<AuthenticatedSubject> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    authorize(header, tokens)
}

/// Gate decision for a raw `Authorization` value
pub fn authorize(header: Option<&str>, tokens: &TokenService) -> AuthResult<AuthenticatedSubject> {
    let token = extract_bearer_token(header).ok_or(AuthError::Missing)?;
    tokens.verify(token)
}

/// Token text following the bearer prefix, up to the next space
pub fn extract_bearer_token(header: Option<&str>) -> Option<&str> {
    let rest = header?.strip_prefix(BEARER_PREFIX)?;
    rest.split(' ').next()
}

/// Create error response for authentication errors
pub fn auth_error_response(error: AuthError) -> Response {
    let status = StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::FORBIDDEN);
    let response = ErrorResponse::from(&error);

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&response).unwrap_or_default()))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

// =============================================================================
// Axum Extractors
// =============================================================================

/// Extractor for the subject admitted by [`AuthLayer`]
///
/// Rejects with the standard 403 when used on a route the layer does not
/// cover.
pub struct RequireAuth(pub AuthenticatedSubject);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedSubject>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| auth_error_response(AuthError::Missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SigningKey;
    use std::time::Duration;

    fn service() -> TokenService {
        TokenService::new(
            &SigningKey::from("test-secret-key-for-jwt-tokens-min-32-bytes!"),
            Duration::from_secs(3600),
        )
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(extract_bearer_token(Some("Bearer abc def")), Some("abc"));
        assert_eq!(extract_bearer_token(Some("Bearer ")), Some(""));
        assert_eq!(extract_bearer_token(Some("bearer abc")), None);
        assert_eq!(extract_bearer_token(Some("Basic dXNlcjpwdw==")), None);
        assert_eq!(extract_bearer_token(Some("Bearerabc")), None);
        assert_eq!(extract_bearer_token(None), None);
    }

    #[test]
    fn test_authorize_missing() {
        let tokens = service();
        assert_eq!(authorize(None, &tokens), Err(AuthError::Missing));
        assert_eq!(authorize(Some("Token abc"), &tokens), Err(AuthError::Missing));
    }

    #[test]
    fn test_authorize_valid() {
        let tokens = service();
        let issued = tokens.issue("user").unwrap();
        let header = format!("Bearer {}", issued.token);

        let subject = authorize(Some(&header), &tokens).unwrap();
        assert_eq!(subject.subject, "user");
    }

    #[test]
    fn test_authorize_empty_token_is_malformed() {
        assert_eq!(authorize(Some("Bearer "), &service()), Err(AuthError::Malformed));
    }

    #[test]
    fn test_authenticate_request_reads_header() {
        let tokens = service();
        let issued = tokens.issue("user").unwrap();

        let mut headers = HeaderMap::new();
        assert_eq!(authenticate_request(&headers, &tokens), Err(AuthError::Missing));

        headers.insert(AUTHORIZATION, format!("Bearer {}", issued.token).parse().unwrap());
        assert!(authenticate_request(&headers, &tokens).is_ok());
    }

    #[tokio::test]
    async fn test_auth_error_response() {
        for err in [AuthError::Missing, AuthError::Expired, AuthError::BadSignature] {
            let response = auth_error_response(err);
            assert_eq!(response.status(), StatusCode::FORBIDDEN);

            let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["message"], "Invalid or expired token");
        }
    }
}
