//! Supply caps and allocation tracking

use nnbu_core::Amount;
use serde::{Deserialize, Serialize};

use crate::constants::{PRE_CROWDSALE_CAP, TOTAL_TOKENS_FOR_CROWDSALE, TOTAL_TOKENS_SUPPLY};
use crate::error::{EconomicsError, Result};

/// Snapshot of how much of each cap has been used
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupplyStats {
    pub total_minted: Amount,
    pub remaining_before_sale: Amount,
    pub remaining_for_crowdsale: Amount,
    pub remaining_total: Amount,
}

/// Nested caps: pre-crowdsale <= crowdsale <= total supply
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SupplyCaps {
    pub total_tokens_supply: Amount,
    pub total_tokens_for_crowdsale: Amount,
    pub pre_crowdsale_cap: Amount,
}

impl SupplyCaps {
    pub fn new(
        total_tokens_supply: Amount,
        total_tokens_for_crowdsale: Amount,
        pre_crowdsale_cap: Amount,
    ) -> Result<Self> {
        let caps = Self {
            total_tokens_supply,
            total_tokens_for_crowdsale,
            pre_crowdsale_cap,
        };
        caps.validate()?;
        Ok(caps)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pre_crowdsale_cap > self.total_tokens_for_crowdsale
            || self.total_tokens_for_crowdsale > self.total_tokens_supply
        {
            return Err(EconomicsError::InvalidCaps(format!(
                "caps must nest: pre-crowdsale {} <= crowdsale {} <= total {}",
                self.pre_crowdsale_cap, self.total_tokens_for_crowdsale, self.total_tokens_supply
            )));
        }
        Ok(())
    }

    pub fn remaining_before_sale(&self, minted: Amount) -> Amount {
        self.pre_crowdsale_cap.saturating_sub(minted)
    }

    pub fn remaining_for_crowdsale(&self, minted: Amount) -> Amount {
        self.total_tokens_for_crowdsale.saturating_sub(minted)
    }

    pub fn remaining_total(&self, minted: Amount) -> Amount {
        self.total_tokens_supply.saturating_sub(minted)
    }

    /// Team share minted at finalization: the reserve slice plus whatever
    /// the crowdsale left unsold.
    pub fn team_allocation(&self, minted: Amount) -> Amount {
        self.remaining_total(minted)
    }

    pub fn stats(&self, minted: Amount) -> SupplyStats {
        SupplyStats {
            total_minted: minted,
            remaining_before_sale: self.remaining_before_sale(minted),
            remaining_for_crowdsale: self.remaining_for_crowdsale(minted),
            remaining_total: self.remaining_total(minted),
        }
    }
}

impl Default for SupplyCaps {
    fn default() -> Self {
        Self {
            total_tokens_supply: TOTAL_TOKENS_SUPPLY,
            total_tokens_for_crowdsale: TOTAL_TOKENS_FOR_CROWDSALE,
            pre_crowdsale_cap: PRE_CROWDSALE_CAP,
        }
    }
}
