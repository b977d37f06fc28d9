//! NNBU Crowdsale
//!
//! The BABY token sale state machine:
//! - Private-investor minting before the sale opens
//! - Whitelisted, time-boxed purchases with a pre-sale bonus
//! - Hard caps with exact remainder bookkeeping
//! - Finalization into the time-locked team reserve
//!
//! `Deployment` wires the sale to its collaborators (token, whitelist,
//! payment balances, team reserves) and drives every operation from a
//! single clock.

pub mod config;
pub mod crowdsale;
pub mod deployment;
pub mod error;
pub mod events;

pub use config::CrowdsaleConfig;
pub use crowdsale::{Crowdsale, CrowdsaleState, PurchaseReceipt, Remainder, SaleStatus};
pub use deployment::Deployment;
pub use error::{Result, SaleError};
pub use events::SaleEvent;

pub use nnbu_economics::{constants, SalePhase};
