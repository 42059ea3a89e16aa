//! Authentication Handlers

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use minibank_auth::LoginError;
use serde_json::Value;
use std::sync::Arc;

use super::body_or_empty;
use crate::dto::{LoginRequest, LoginResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Exchange the username/password pair for an access token
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let request = LoginRequest::from_body(&body_or_empty(body));

    let (Some(username), Some(password)) = (request.username, request.password) else {
        metrics::counter!("minibank_logins_total", "outcome" => "rejected").increment(1);
        tracing::info!("Login rejected: missing username or password");
        return Err(LoginError::BadCredentials.into());
    };

    let issued = state.auth.login(&username, &password).map_err(|e| {
        metrics::counter!("minibank_logins_total", "outcome" => "rejected").increment(1);
        tracing::info!(username = %username, "Login rejected");
        ApiError::from(e)
    })?;

    metrics::counter!("minibank_logins_total", "outcome" => "accepted").increment(1);
    tracing::info!(
        username = %username,
        expires_at = issued.expires_at,
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        token: issued.token,
    }))
}
