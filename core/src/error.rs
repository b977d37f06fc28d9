//! Ledger error types

use thiserror::Error;

/// Token ledger, whitelist and payment balance errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Token transfers are paused")]
    Paused,

    #[error("Minting has finished")]
    MintingFinished,

    #[error("Supply cap reached: requested {requested}, available {available}")]
    CapReached { requested: u128, available: u128 },

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u128, available: u128 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Arithmetic overflow")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
