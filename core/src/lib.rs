//! NNBU Core Library
//!
//! Shared building blocks for the BABY token sale:
//! - Units, addresses and the per-call execution context
//! - Clocks (system and manually driven)
//! - The mintable, pausable token ledger
//! - The owner-managed purchase whitelist
//! - Native payment balances

pub mod clock;
pub mod error;
pub mod funds;
pub mod token;
pub mod types;
pub mod whitelist;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{LedgerError, Result};
pub use funds::NativeBalances;
pub use token::{MintingState, PauseState, Token, TokenEvent, TokenLedger};
pub use types::{
    contract_address, ensure_address, Address, Amount, CallContext, Timestamp, SECONDS_PER_DAY,
    TOKEN_DECIMALS, TOKEN_UNIT,
};
pub use whitelist::{Whitelist, WhitelistEvent, WhitelistOperation, WhitelistRegistry};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_constants() {
        assert_eq!(TOKEN_DECIMALS, 18);
        assert_eq!(TOKEN_UNIT, 1_000_000_000_000_000_000);
        assert_eq!(SECONDS_PER_DAY, 86_400);
    }
}
