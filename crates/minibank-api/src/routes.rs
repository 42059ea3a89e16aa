//! API Routes

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Routes open to anyone
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/health", get(handlers::health::health_check))
}

/// Routes behind the bearer-token gate
pub fn protected_routes(state: &AppState) -> Router<Arc<AppState>> {
    Router::new()
        .route("/balance", get(handlers::ledger::get_balance))
        .route("/deposit", post(handlers::ledger::deposit))
        .route("/withdraw", post(handlers::ledger::withdraw))
        .route_layer(state.auth.layer())
}
