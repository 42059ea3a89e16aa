//! Application state shared across handlers

use minibank_auth::AuthService;
use minibank_ledger::Ledger;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Credential check and token service
    pub auth: AuthService,
    /// The shared balance
    pub ledger: Ledger,
}

impl AppState {
    pub fn new(auth: AuthService, ledger: Ledger) -> Self {
        Self { auth, ledger }
    }
}
