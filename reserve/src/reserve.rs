//! Time-locked team reserve

use log::{info, warn};
use nnbu_core::{ensure_address, Address, Amount, CallContext, Timestamp, TokenLedger};
use serde::{Deserialize, Serialize};

use crate::error::{ReserveError, Result};
use nnbu_economics::constants::{RESERVE_KILL_DELAY, RESERVE_UNLOCK_DELAY};

/// Lifecycle of the reserve. Both `Unlocked` and `Killed` are terminal for
/// `unlock`; only `Killed` is terminal for `kill`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReserveState {
    Locked,
    Unlocked,
    Killed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ReserveEvent {
    Unlocked { beneficiary: Address, amount: Amount },
    Killed { recipient: Address, amount: Amount },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamReserve {
    address: Address,
    owner: Address,
    beneficiary: Address,
    token: Address,
    created_at: Timestamp,
    unlock_time: Timestamp,
    kill_time: Timestamp,
    state: ReserveState,
    events: Vec<ReserveEvent>,
}

impl TeamReserve {
    /// Deploy a reserve at `address`. The caller becomes the owner, and the
    /// lock runs from `ctx.now`.
    pub fn new(
        ctx: &CallContext,
        address: impl Into<Address>,
        token: impl Into<Address>,
        beneficiary: impl Into<Address>,
    ) -> Result<Self> {
        let address = address.into();
        let token = token.into();
        let beneficiary = beneficiary.into();
        for (value, what) in [
            (&address, "reserve address"),
            (&token, "token address"),
            (&beneficiary, "beneficiary"),
        ] {
            ensure_address(value, what)
                .map_err(|e| ReserveError::InvalidParameter(e.to_string()))?;
        }

        let unlock_time = ctx.now.saturating_add(RESERVE_UNLOCK_DELAY);
        let kill_time = ctx.now.saturating_add(RESERVE_KILL_DELAY);

        info!(
            "Team reserve {} deployed: unlocks at {}, reclaimable at {}",
            address, unlock_time, kill_time
        );

        Ok(Self {
            address,
            owner: ctx.caller.clone(),
            beneficiary,
            token,
            created_at: ctx.now,
            unlock_time,
            kill_time,
            state: ReserveState::Locked,
            events: Vec::new(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn beneficiary(&self) -> &str {
        &self.beneficiary
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn unlock_time(&self) -> Timestamp {
        self.unlock_time
    }

    pub fn kill_time(&self) -> Timestamp {
        self.kill_time
    }

    pub fn state(&self) -> ReserveState {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == ReserveState::Unlocked
    }

    pub fn events(&self) -> &[ReserveEvent] {
        &self.events
    }

    /// Tokens currently held
    pub fn balance<L: TokenLedger + ?Sized>(&self, ledger: &L) -> Amount {
        ledger.balance_of(&self.address)
    }

    /// Release the whole balance to the beneficiary. Anyone may call once
    /// the lock has expired.
    pub fn unlock<L: TokenLedger + ?Sized>(
        &mut self,
        ctx: &CallContext,
        ledger: &mut L,
    ) -> Result<Amount> {
        match self.state {
            ReserveState::Killed => return Err(ReserveError::Disabled),
            ReserveState::Unlocked => return Err(ReserveError::AlreadyUnlocked),
            ReserveState::Locked => {}
        }
        if ctx.now < self.unlock_time {
            warn!(
                "Reserve {} unlock attempted {}s early",
                self.address,
                self.unlock_time - ctx.now
            );
            return Err(ReserveError::TooEarly {
                now: ctx.now,
                available_at: self.unlock_time,
            });
        }

        let amount = ledger.balance_of(&self.address);
        ledger.transfer(&self.address, &self.beneficiary, amount)?;

        self.state = ReserveState::Unlocked;
        self.events.push(ReserveEvent::Unlocked {
            beneficiary: self.beneficiary.clone(),
            amount,
        });
        info!(
            "Reserve {} unlocked: {} base units to {}",
            self.address, amount, self.beneficiary
        );
        Ok(amount)
    }

    /// Send whatever is left to the owner and disable the reserve.
    /// Works whether or not `unlock` already ran.
    pub fn kill<L: TokenLedger + ?Sized>(
        &mut self,
        ctx: &CallContext,
        ledger: &mut L,
    ) -> Result<Amount> {
        if self.state == ReserveState::Killed {
            return Err(ReserveError::Disabled);
        }
        if ctx.caller != self.owner {
            return Err(ReserveError::Unauthorized(format!(
                "{} does not own reserve {}",
                ctx.caller, self.address
            )));
        }
        if ctx.now < self.kill_time {
            return Err(ReserveError::TooEarly {
                now: ctx.now,
                available_at: self.kill_time,
            });
        }

        let amount = ledger.balance_of(&self.address);
        ledger.transfer(&self.address, &ctx.caller, amount)?;

        self.state = ReserveState::Killed;
        self.events.push(ReserveEvent::Killed {
            recipient: ctx.caller.clone(),
            amount,
        });
        info!(
            "Reserve {} killed: {} base units returned to {}",
            self.address, amount, ctx.caller
        );
        Ok(amount)
    }
}
