//! minibank Ledger - one shared balance
//!
//! The ledger is:
//! - Global (the balance is not keyed by user)
//! - In-memory (reset on every process start)
//! - Serialized (each mutation holds the write lock for its whole
//!   read-check-write)
//!
//! # Invariants
//!
//! 1. A withdrawal never takes the balance below zero
//! 2. Amount shape is checked before funds, so a negative withdrawal is
//!    `InvalidAmount`, never `InsufficientFunds`
//! 3. A failed operation leaves the balance untouched

pub mod amount;

pub use amount::Amount;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

/// Default opening balance
pub const DEFAULT_STARTING_BALANCE: f64 = 1000.0;

/// Kind of balance mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOp {
    Deposit,
    Withdrawal,
}

impl LedgerOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
        }
    }
}

impl std::fmt::Display for LedgerOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in ledger operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Invalid {0} amount")]
    InvalidAmount(LedgerOp),

    #[error("Insufficient balance")]
    InsufficientFunds { available: Amount, requested: Amount },
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// The shared balance
#[derive(Clone, Debug)]
pub struct Ledger {
    balance: Arc<RwLock<Amount>>,
}

impl Ledger {
    /// Create a ledger holding `starting_balance`
    pub fn new(starting_balance: impl Into<Amount>) -> Self {
        Self {
            balance: Arc::new(RwLock::new(starting_balance.into())),
        }
    }

    /// Current balance
    pub async fn balance(&self) -> Amount {
        *self.balance.read().await
    }

    /// Add `amount` to the balance
    ///
    /// Returns the new balance.
    pub async fn deposit(&self, amount: impl Into<Amount>) -> Result<Amount> {
        let amount = amount.into();
        if !amount.is_valid_operand() {
            return Err(LedgerError::InvalidAmount(LedgerOp::Deposit));
        }

        let mut balance = self.balance.write().await;
        let new_balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount(LedgerOp::Deposit))?;
        *balance = new_balance;

        Ok(new_balance)
    }

    /// Take `amount` from the balance
    ///
    /// Returns the new balance. Fails if balance would go negative.
    pub async fn withdraw(&self, amount: impl Into<Amount>) -> Result<Amount> {
        let amount = amount.into();
        if !amount.is_valid_operand() {
            return Err(LedgerError::InvalidAmount(LedgerOp::Withdrawal));
        }

        let mut balance = self.balance.write().await;
        let new_balance = balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds {
                available: *balance,
                requested: amount,
            })?;
        *balance = new_balance;

        Ok(new_balance)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_BALANCE)
    }
}
