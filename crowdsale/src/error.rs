//! Crowdsale error types

use nnbu_core::{Address, Amount, LedgerError, Timestamp};
use nnbu_economics::EconomicsError;
use nnbu_reserve::ReserveError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SaleError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Rate must be greater than zero")]
    InvalidRate,

    #[error("Outside sale window: now {now}, window [{start}, {end}]")]
    OutsideSaleWindow {
        now: Timestamp,
        start: Timestamp,
        end: Timestamp,
    },

    #[error("Sale has already started")]
    NotBeforeSaleStart,

    #[error("Sale has not ended")]
    NotEnded,

    #[error("Address not whitelisted: {0}")]
    NotWhitelisted(Address),

    #[error("Contribution below minimum: provided {provided}, minimum {minimum}")]
    BelowMinimumContribution { provided: Amount, minimum: Amount },

    #[error("Cap exceeded: requested {requested}, available {available}")]
    CapExceeded { requested: Amount, available: Amount },

    #[error("Sale is paused")]
    Paused,

    #[error("Sale already finalized")]
    AlreadyFinalized,

    #[error("Purchaser {caller} must be the beneficiary {beneficiary}")]
    NotPurchaser { caller: Address, beneficiary: Address },

    #[error("Unknown reserve: {0}")]
    UnknownReserve(Address),

    #[error("Economics error: {0}")]
    Economics(#[from] EconomicsError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Reserve error: {0}")]
    Reserve(#[from] ReserveError),
}

pub type Result<T> = std::result::Result<T, SaleError>;
