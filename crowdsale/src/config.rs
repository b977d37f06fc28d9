//! Crowdsale deployment parameters

use nnbu_core::{ensure_address, Address, Amount, Timestamp};
use nnbu_economics::constants::{MIN_CONTRIBUTION, PRESALE_BONUS_PERCENT};
use nnbu_economics::{SaleSchedule, SupplyCaps};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SaleError};

/// Fixed at construction. The live rate is tracked separately in
/// `CrowdsaleState` because the owner may change it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrowdsaleConfig {
    pub start_time: Timestamp,
    #[serde(default)]
    pub presale_end_time: Option<Timestamp>,
    pub end_time: Timestamp,
    /// Initial tokens per payment unit
    pub rate: Amount,
    /// Whitelist registry consulted on every purchase
    pub whitelist: Address,
    /// Receives purchase payments
    pub wallet: Address,
    #[serde(default)]
    pub caps: SupplyCaps,
    #[serde(default = "default_presale_bonus")]
    pub presale_bonus_percent: u32,
    #[serde(default = "default_min_contribution")]
    pub min_contribution: Amount,
}

fn default_presale_bonus() -> u32 {
    PRESALE_BONUS_PERCENT
}

fn default_min_contribution() -> Amount {
    MIN_CONTRIBUTION
}

impl CrowdsaleConfig {
    /// Standard caps, 60% pre-sale bonus, one-unit minimum
    pub fn new(
        start_time: Timestamp,
        presale_end_time: Option<Timestamp>,
        end_time: Timestamp,
        whitelist: impl Into<Address>,
        rate: Amount,
        wallet: impl Into<Address>,
    ) -> Self {
        Self {
            start_time,
            presale_end_time,
            end_time,
            rate,
            whitelist: whitelist.into(),
            wallet: wallet.into(),
            caps: SupplyCaps::default(),
            presale_bonus_percent: PRESALE_BONUS_PERCENT,
            min_contribution: MIN_CONTRIBUTION,
        }
    }

    pub fn with_caps(mut self, caps: SupplyCaps) -> Self {
        self.caps = caps;
        self
    }

    pub fn with_presale_bonus(mut self, percent: u32) -> Self {
        self.presale_bonus_percent = percent;
        self
    }

    pub fn with_min_contribution(mut self, minimum: Amount) -> Self {
        self.min_contribution = minimum;
        self
    }

    pub fn schedule(&self) -> SaleSchedule {
        SaleSchedule {
            start_time: self.start_time,
            presale_end_time: self.presale_end_time,
            end_time: self.end_time,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.schedule()
            .validate()
            .map_err(|e| SaleError::InvalidParameter(e.to_string()))?;
        self.caps
            .validate()
            .map_err(|e| SaleError::InvalidParameter(e.to_string()))?;
        if self.rate == 0 {
            return Err(SaleError::InvalidRate);
        }
        ensure_address(&self.wallet, "wallet")
            .map_err(|e| SaleError::InvalidParameter(e.to_string()))?;
        ensure_address(&self.whitelist, "whitelist")
            .map_err(|e| SaleError::InvalidParameter(e.to_string()))?;
        Ok(())
    }
}
