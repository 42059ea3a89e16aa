//! Balance Handlers
//!
//! All routes here sit behind the auth layer. The subject is only used for
//! logging: the balance is shared.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use minibank_auth::RequireAuth;
use minibank_ledger::{LedgerError, LedgerOp};
use serde_json::Value;
use std::sync::Arc;

use super::body_or_empty;
use crate::dto::{amount_from_body, BalanceResponse, TransactionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Current balance
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    RequireAuth(subject): RequireAuth,
) -> Json<BalanceResponse> {
    let balance = state.ledger.balance().await;
    tracing::debug!(subject = %subject, %balance, "Balance read");
    Json(BalanceResponse { balance })
}

/// Add funds
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    RequireAuth(subject): RequireAuth,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<TransactionResponse>> {
    apply(&state, &subject.subject, LedgerOp::Deposit, body_or_empty(body)).await
}

/// Take funds
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    RequireAuth(subject): RequireAuth,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<TransactionResponse>> {
    apply(&state, &subject.subject, LedgerOp::Withdrawal, body_or_empty(body)).await
}

async fn apply(
    state: &AppState,
    subject: &str,
    op: LedgerOp,
    body: Value,
) -> ApiResult<Json<TransactionResponse>> {
    let result = async {
        let amount = amount_from_body(&body, op)?;
        let new_balance = match op {
            LedgerOp::Deposit => state.ledger.deposit(amount).await?,
            LedgerOp::Withdrawal => state.ledger.withdraw(amount).await?,
        };
        Ok::<_, LedgerError>((amount, new_balance))
    }
    .await;

    match result {
        Ok((amount, new_balance)) => {
            metrics::counter!(
                "minibank_ledger_operations_total",
                "operation" => op.as_str(),
                "outcome" => "applied"
            )
            .increment(1);
            tracing::info!(
                subject = %subject,
                operation = %op,
                %amount,
                %new_balance,
                "Ledger operation applied"
            );
            Ok(Json(TransactionResponse::new(op, amount, new_balance)))
        }
        Err(e) => {
            let outcome = match e {
                LedgerError::InvalidAmount(_) => "invalid_amount",
                LedgerError::InsufficientFunds { .. } => "insufficient_funds",
            };
            metrics::counter!(
                "minibank_ledger_operations_total",
                "operation" => op.as_str(),
                "outcome" => outcome
            )
            .increment(1);
            tracing::info!(subject = %subject, operation = %op, error = %e, "Ledger operation refused");
            Err(e.into())
        }
    }
}
