//! Team reserve error types

use nnbu_core::{LedgerError, Timestamp};
use thiserror::Error;

/// Team reserve errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReserveError {
    #[error("Too early: available at {available_at}, now {now}")]
    TooEarly { now: Timestamp, available_at: Timestamp },

    #[error("Reserve already unlocked")]
    AlreadyUnlocked,

    #[error("Reserve has been killed")]
    Disabled,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

pub type Result<T> = std::result::Result<T, ReserveError>;
