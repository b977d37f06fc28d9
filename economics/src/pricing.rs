//! Sale schedule and purchase pricing
//!
//! Pure functions of (time, schedule, base rate). Tokens per purchase are
//! `floor(payment × rate)` in base units; the pre-sale window multiplies the
//! base rate by `(100 + bonus) / 100`.

use nnbu_core::{Amount, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::{EconomicsError, Result};

/// Where the sale stands at a given moment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SalePhase {
    /// Before `start_time`; only private-investor minting is possible
    NotStarted,
    /// `[start_time, presale_end_time)`, bonus rate applies
    PreSale,
    /// `[presale_end_time, end_time]`, base rate applies
    PublicSale,
    /// After `end_time`, waiting for finalization
    Ended,
    /// Finalized; terminal
    Finalized,
}

impl SalePhase {
    /// Purchases are only accepted in these phases
    pub fn accepts_purchases(&self) -> bool {
        matches!(self, SalePhase::PreSale | SalePhase::PublicSale)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaleSchedule {
    pub start_time: Timestamp,
    /// Equal to `start_time` (or absent) when there is no pre-sale
    pub presale_end_time: Option<Timestamp>,
    pub end_time: Timestamp,
}

impl SaleSchedule {
    pub fn new(
        start_time: Timestamp,
        presale_end_time: Option<Timestamp>,
        end_time: Timestamp,
    ) -> Result<Self> {
        let schedule = Self {
            start_time,
            presale_end_time,
            end_time,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_time >= self.end_time {
            return Err(EconomicsError::InvalidSchedule(format!(
                "start time {} must be before end time {}",
                self.start_time, self.end_time
            )));
        }
        if let Some(presale_end) = self.presale_end_time {
            if presale_end < self.start_time || presale_end > self.end_time {
                return Err(EconomicsError::InvalidSchedule(format!(
                    "pre-sale end {} must lie within [{}, {}]",
                    presale_end, self.start_time, self.end_time
                )));
            }
        }
        Ok(())
    }

    /// End of the bonus window; `start_time` when there is none
    pub fn presale_end(&self) -> Timestamp {
        self.presale_end_time.unwrap_or(self.start_time)
    }

    pub fn has_presale(&self) -> bool {
        self.presale_end() > self.start_time
    }

    /// Time-derived phase. Finalization is layered on by the sale itself.
    pub fn phase_at(&self, now: Timestamp) -> SalePhase {
        if now < self.start_time {
            SalePhase::NotStarted
        } else if now < self.presale_end() {
            SalePhase::PreSale
        } else if now <= self.end_time {
            SalePhase::PublicSale
        } else {
            SalePhase::Ended
        }
    }

    /// `start_time <= now <= end_time`
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.phase_at(now).accepts_purchases()
    }

    pub fn has_ended(&self, now: Timestamp) -> bool {
        now > self.end_time
    }
}

/// Tokens per payment unit at a given moment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EffectiveRate {
    pub base: Amount,
    pub bonus_percent: u32,
}

impl EffectiveRate {
    pub fn new(base: Amount, bonus_percent: u32) -> Result<Self> {
        if base == 0 {
            return Err(EconomicsError::InvalidRate);
        }
        Ok(Self {
            base,
            bonus_percent,
        })
    }

    /// Rate in force at `now`, or `None` outside the sale window
    pub fn at(
        schedule: &SaleSchedule,
        base: Amount,
        presale_bonus_percent: u32,
        now: Timestamp,
    ) -> Result<Option<Self>> {
        match schedule.phase_at(now) {
            SalePhase::PreSale => Self::new(base, presale_bonus_percent).map(Some),
            SalePhase::PublicSale => Self::new(base, 0).map(Some),
            _ => Ok(None),
        }
    }

    fn scaled_numerator(&self) -> Result<Amount> {
        self.base
            .checked_mul(100 + Amount::from(self.bonus_percent))
            .ok_or(EconomicsError::Overflow)
    }

    /// `floor(payment × base × (100 + bonus) / 100)`
    pub fn tokens_for(&self, payment: Amount) -> Result<Amount> {
        let tokens = payment
            .checked_mul(self.scaled_numerator()?)
            .ok_or(EconomicsError::Overflow)?;
        Ok(tokens / 100)
    }

    /// Smallest payment whose tokens cover `tokens`
    pub fn payment_for(&self, tokens: Amount) -> Result<Amount> {
        let numerator = tokens.checked_mul(100).ok_or(EconomicsError::Overflow)?;
        let denominator = self.scaled_numerator()?;
        Ok(numerator.div_ceil(denominator))
    }
}
