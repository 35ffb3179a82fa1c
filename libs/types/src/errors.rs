//! Error types for the bridge domain model
//!
//! Validation errors shared across services using thiserror

use thiserror::Error;

/// Signal validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("Signal amount must be positive, got {amount}")]
    NonPositiveAmount { amount: String },
}

/// Balance errors raised during settlement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error("Insufficient balance for asset {asset}: required {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: String,
        available: String,
    },
}
