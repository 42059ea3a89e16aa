//! Balance DTOs

use minibank_ledger::{Amount, LedgerError, LedgerOp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Read `amount` from a deposit or withdrawal body
///
/// Anything but a JSON number is an invalid amount for `op`. Sign and
/// finiteness are checked by the ledger.
pub fn amount_from_body(body: &Value, op: LedgerOp) -> Result<Amount, LedgerError> {
    body.get("amount")
        .and_then(Value::as_f64)
        .map(Amount::new)
        .ok_or(LedgerError::InvalidAmount(op))
}

/// Balance response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: Amount,
}

/// Deposit / withdrawal response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// e.g. `Deposited $500`
    pub message: String,
    pub new_balance: Amount,
}

impl TransactionResponse {
    pub fn new(op: LedgerOp, amount: Amount, new_balance: Amount) -> Self {
        let message = match op {
            LedgerOp::Deposit => format!("Deposited ${}", amount),
            LedgerOp::Withdrawal => format!("Withdrew ${}", amount),
        };
        Self { message, new_balance }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_from_body() {
        assert_eq!(
            amount_from_body(&json!({"amount": 500}), LedgerOp::Deposit),
            Ok(Amount::new(500.0))
        );
        assert_eq!(
            amount_from_body(&json!({"amount": 12.5}), LedgerOp::Deposit),
            Ok(Amount::new(12.5))
        );
        // Sign is left to the ledger
        assert_eq!(
            amount_from_body(&json!({"amount": -3}), LedgerOp::Withdrawal),
            Ok(Amount::new(-3.0))
        );
    }

    #[test]
    fn test_non_numeric_amount() {
        for body in [
            json!({"amount": "500"}),
            json!({"amount": null}),
            json!({"amount": true}),
            json!({}),
            json!(null),
        ] {
            assert_eq!(
                amount_from_body(&body, LedgerOp::Withdrawal),
                Err(LedgerError::InvalidAmount(LedgerOp::Withdrawal))
            );
        }
    }

    #[test]
    fn test_transaction_response_shape() {
        let response = TransactionResponse::new(LedgerOp::Deposit, Amount::new(500.0), Amount::new(1500.0));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"message": "Deposited $500", "newBalance": 1500})
        );

        let response = TransactionResponse::new(LedgerOp::Withdrawal, Amount::new(0.5), Amount::new(999.5));
        assert_eq!(response.message, "Withdrew $0.5");

        let response = TransactionResponse::new(LedgerOp::Deposit, Amount::new(1e-7), Amount::new(1000.0));
        assert_eq!(response.message, "Deposited $1e-7");
    }
}
