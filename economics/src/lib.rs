//! NNBU Economics Module
//!
//! Implements the sale's economic model:
//! - Sale phases derived from the schedule
//! - Base rate and pre-sale bonus pricing
//! - Supply caps and the team reserve allocation

pub mod error;
pub mod pricing;
pub mod supply;

pub use error::{EconomicsError, Result};
pub use pricing::{EffectiveRate, SalePhase, SaleSchedule};
pub use supply::{SupplyCaps, SupplyStats};

/// Economic constants
pub mod constants {
    use nnbu_core::{Amount, Timestamp, SECONDS_PER_DAY, TOKEN_UNIT};

    /// Total BABY that will ever exist (60,000,000)
    pub const TOTAL_TOKENS_SUPPLY: Amount = 60_000_000 * TOKEN_UNIT;

    /// BABY sold through the crowdsale (52,500,000)
    pub const TOTAL_TOKENS_FOR_CROWDSALE: Amount = 52_500_000 * TOKEN_UNIT;

    /// BABY mintable before the public sale (20,000,000)
    pub const PRE_CROWDSALE_CAP: Amount = 20_000_000 * TOKEN_UNIT;

    /// Team reserve when the crowdsale sells out (7,500,000)
    pub const TEAM_RESERVE: Amount = TOTAL_TOKENS_SUPPLY - TOTAL_TOKENS_FOR_CROWDSALE;

    /// Pre-sale bonus over the base rate (60%)
    pub const PRESALE_BONUS_PERCENT: u32 = 60;

    /// Smallest accepted purchase (one whole payment unit)
    pub const MIN_CONTRIBUTION: Amount = TOKEN_UNIT;

    /// Reserve unlocks one year after creation
    pub const RESERVE_UNLOCK_DELAY: Timestamp = 365 * SECONDS_PER_DAY;

    /// Reserve can be reclaimed 465 days after creation
    pub const RESERVE_KILL_DELAY: Timestamp = 465 * SECONDS_PER_DAY;
}

#[cfg(test)]
mod tests {
    use super::constants::*;
    use nnbu_core::TOKEN_UNIT;

    #[test]
    fn test_economic_constants() {
        assert_eq!(TEAM_RESERVE, 7_500_000 * TOKEN_UNIT);
        assert!(PRE_CROWDSALE_CAP <= TOTAL_TOKENS_FOR_CROWDSALE);
        assert!(RESERVE_KILL_DELAY > RESERVE_UNLOCK_DELAY);
        assert_eq!(PRESALE_BONUS_PERCENT, 60);
    }
}
