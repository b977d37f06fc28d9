//! Native payment currency balances
//!
//! Purchases are paid in the chain's native unit. The sale never holds
//! funds: the paid portion goes straight to the sale wallet and any
//! capped-out remainder stays with the caller.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{LedgerError, Result};
use crate::types::{Address, Amount};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NativeBalances {
    accounts: HashMap<Address, Amount>,
}

impl NativeBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, address: &str) -> Amount {
        self.accounts.get(address).copied().unwrap_or(0)
    }

    /// Add funds to an account (genesis allocation, faucet)
    pub fn credit(&mut self, address: &str, amount: Amount) -> Result<()> {
        let balance = self.accounts.entry(address.to_string()).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    pub fn ensure_funds(&self, address: &str, amount: Amount) -> Result<()> {
        let available = self.balance_of(address);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        Ok(())
    }

    pub fn transfer(&mut self, from: &str, to: &str, amount: Amount) -> Result<()> {
        self.ensure_funds(from, amount)?;
        if amount == 0 || from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let debited = self.balance_of(from) - amount;
        self.accounts.insert(from.to_string(), debited);
        self.accounts.insert(to.to_string(), credited);
        Ok(())
    }
}
