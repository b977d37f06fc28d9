//! Economics error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomicsError {
    #[error("Rate must be greater than zero")]
    InvalidRate,

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid caps: {0}")]
    InvalidCaps(String),

    #[error("Arithmetic overflow")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, EconomicsError>;
