//! Request handlers

pub mod auth;
pub mod health;
pub mod ledger;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value;

/// Body of a JSON request, or `{}` when it is missing or unreadable
///
/// Unreadable covers a wrong or absent content type as well as
/// syntactically malformed JSON: none of these is a 400 of its own. Login
/// then fails on missing credentials (401) and balance mutations on a
/// missing amount (400 invalid amount).
pub(crate) fn body_or_empty(body: Result<Json<Value>, JsonRejection>) -> Value {
    match body {
        Ok(Json(value)) => value,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable request body, treating as empty");
            Value::Object(Default::default())
        }
    }
}
