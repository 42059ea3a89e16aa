//! Data Transfer Objects
//!
//! Request bodies are read from loose JSON: a missing body, a missing field
//! or a field of the wrong type is treated like a wrong value rather than a
//! decoding failure.

pub mod auth;
pub mod ledger;

pub use auth::*;
pub use ledger::*;
