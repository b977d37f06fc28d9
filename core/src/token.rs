//! BABY token ledger
//!
//! A mintable, capped, pausable balance ledger. The sale contract owns it:
//! only the owner may mint, pause, unpause or finish minting. Transfers are
//! blocked while paused; minting is not.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{LedgerError, Result};
use crate::types::{ensure_address, Address, Amount, TOKEN_DECIMALS};

pub const TOKEN_NAME: &str = "The Baby Token";
pub const TOKEN_SYMBOL: &str = "BABY";

/// Ledger operations consumed by the sale and the team reserve
pub trait TokenLedger {
    fn mint(&mut self, caller: &str, to: &str, amount: Amount) -> Result<()>;
    fn finish_minting(&mut self, caller: &str) -> Result<()>;
    fn pause(&mut self, caller: &str) -> Result<()>;
    fn unpause(&mut self, caller: &str) -> Result<()>;
    fn transfer(&mut self, caller: &str, to: &str, amount: Amount) -> Result<()>;
    fn balance_of(&self, address: &str) -> Amount;
    fn total_supply(&self) -> Amount;
    fn paused(&self) -> bool;
    fn minting_finished(&self) -> bool;
}

/// One-way minting switch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MintingState {
    Open,
    Finished,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PauseState {
    Running,
    Paused,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum TokenEvent {
    Mint { to: Address, amount: Amount },
    MintFinished,
    Transfer { from: Address, to: Address, amount: Amount },
    Pause,
    Unpause,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    address: Address,
    owner: Address,
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
    cap: Option<Amount>,
    minting: MintingState,
    pause: PauseState,
    events: Vec<TokenEvent>,
}

impl Token {
    /// New token owned by `owner`. Starts paused with minting open.
    pub fn new(address: impl Into<Address>, owner: impl Into<Address>) -> Self {
        Token {
            address: address.into(),
            owner: owner.into(),
            balances: HashMap::new(),
            total_supply: 0,
            cap: None,
            minting: MintingState::Open,
            pause: PauseState::Paused,
            events: Vec::new(),
        }
    }

    /// Bound the total supply that can ever be minted
    pub fn with_cap(mut self, cap: Amount) -> Self {
        self.cap = Some(cap);
        self
    }

    pub fn name(&self) -> &'static str {
        TOKEN_NAME
    }

    pub fn symbol(&self) -> &'static str {
        TOKEN_SYMBOL
    }

    pub fn decimals(&self) -> u32 {
        TOKEN_DECIMALS
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn cap(&self) -> Option<Amount> {
        self.cap
    }

    pub fn events(&self) -> &[TokenEvent] {
        &self.events
    }

    fn only_owner(&self, caller: &str, action: &str) -> Result<()> {
        if caller != self.owner {
            return Err(LedgerError::Unauthorized(format!(
                "{} may not {} on {}",
                caller, action, TOKEN_SYMBOL
            )));
        }
        Ok(())
    }
}

impl TokenLedger for Token {
    fn mint(&mut self, caller: &str, to: &str, amount: Amount) -> Result<()> {
        self.only_owner(caller, "mint")?;
        ensure_address(to, "mint recipient")?;
        if self.minting == MintingState::Finished {
            return Err(LedgerError::MintingFinished);
        }

        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        if let Some(cap) = self.cap {
            if new_supply > cap {
                return Err(LedgerError::CapReached {
                    requested: amount,
                    available: cap.saturating_sub(self.total_supply),
                });
            }
        }

        let balance = self.balances.entry(to.to_string()).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.total_supply = new_supply;

        debug!("minted {} base units of {} to {}", amount, TOKEN_SYMBOL, to);
        self.events.push(TokenEvent::Mint {
            to: to.to_string(),
            amount,
        });
        Ok(())
    }

    fn finish_minting(&mut self, caller: &str) -> Result<()> {
        self.only_owner(caller, "finish minting")?;
        if self.minting == MintingState::Finished {
            return Err(LedgerError::MintingFinished);
        }
        self.minting = MintingState::Finished;
        self.events.push(TokenEvent::MintFinished);
        Ok(())
    }

    fn pause(&mut self, caller: &str) -> Result<()> {
        self.only_owner(caller, "pause")?;
        if self.pause == PauseState::Paused {
            return Err(LedgerError::InvalidParameter(
                "token is already paused".to_string(),
            ));
        }
        self.pause = PauseState::Paused;
        self.events.push(TokenEvent::Pause);
        Ok(())
    }

    fn unpause(&mut self, caller: &str) -> Result<()> {
        self.only_owner(caller, "unpause")?;
        if self.pause == PauseState::Running {
            return Err(LedgerError::InvalidParameter(
                "token is not paused".to_string(),
            ));
        }
        self.pause = PauseState::Running;
        self.events.push(TokenEvent::Unpause);
        Ok(())
    }

    fn transfer(&mut self, caller: &str, to: &str, amount: Amount) -> Result<()> {
        if self.pause == PauseState::Paused {
            return Err(LedgerError::Paused);
        }
        ensure_address(to, "transfer recipient")?;

        let available = self.balance_of(caller);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        if amount > 0 && caller != to {
            let credited = self
                .balance_of(to)
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?;
            self.balances.insert(caller.to_string(), available - amount);
            self.balances.insert(to.to_string(), credited);
        }

        self.events.push(TokenEvent::Transfer {
            from: caller.to_string(),
            to: to.to_string(),
            amount,
        });
        Ok(())
    }

    fn balance_of(&self, address: &str) -> Amount {
        self.balances.get(address).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn paused(&self) -> bool {
        self.pause == PauseState::Paused
    }

    fn minting_finished(&self) -> bool {
        self.minting == MintingState::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TOKEN_UNIT;

    fn token() -> Token {
        Token::new("token", "sale")
    }

    #[test]
    fn test_metadata() {
        let token = token();
        assert_eq!(token.name(), "The Baby Token");
        assert_eq!(token.symbol(), "BABY");
        assert_eq!(token.decimals(), 18);
    }

    #[test]
    fn test_starts_paused_with_minting_open() {
        let token = token();
        assert!(token.paused());
        assert!(!token.minting_finished());
        assert_eq!(token.total_supply(), 0);
    }

    #[test]
    fn test_mint() {
        let mut token = token();

        let result = token.mint("sale", "alice", 1000);
        assert!(result.is_ok());
        assert_eq!(token.balance_of("alice"), 1000);
        assert_eq!(token.total_supply(), 1000);
        assert_eq!(
            token.events().last(),
            Some(&TokenEvent::Mint {
                to: "alice".to_string(),
                amount: 1000
            })
        );
    }

    #[test]
    fn test_only_owner_mints() {
        let mut token = token();
        let result = token.mint("alice", "alice", 1000);
        assert!(matches!(result, Err(LedgerError::Unauthorized(_))));
        assert_eq!(token.balance_of("alice"), 0);
    }

    #[test]
    fn test_cap_is_enforced() {
        let mut token = token().with_cap(10 * TOKEN_UNIT);
        token.mint("sale", "alice", 6 * TOKEN_UNIT).unwrap();

        let result = token.mint("sale", "bob", 5 * TOKEN_UNIT);
        assert_eq!(
            result,
            Err(LedgerError::CapReached {
                requested: 5 * TOKEN_UNIT,
                available: 4 * TOKEN_UNIT
            })
        );
        assert_eq!(token.total_supply(), 6 * TOKEN_UNIT);
    }

    #[test]
    fn test_finish_minting_is_one_way() {
        let mut token = token();
        token.finish_minting("sale").unwrap();
        assert!(token.minting_finished());

        assert_eq!(token.mint("sale", "alice", 1), Err(LedgerError::MintingFinished));
        assert_eq!(token.finish_minting("sale"), Err(LedgerError::MintingFinished));
    }

    #[test]
    fn test_transfer_blocked_while_paused() {
        let mut token = token();
        token.mint("sale", "alice", 1000).unwrap();

        assert_eq!(token.transfer("alice", "bob", 500), Err(LedgerError::Paused));

        token.unpause("sale").unwrap();
        token.transfer("alice", "bob", 500).unwrap();
        assert_eq!(token.balance_of("alice"), 500);
        assert_eq!(token.balance_of("bob"), 500);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let mut token = token();
        token.unpause("sale").unwrap();
        token.mint("sale", "alice", 100).unwrap();

        let result = token.transfer("alice", "bob", 101);
        assert_eq!(
            result,
            Err(LedgerError::InsufficientBalance {
                requested: 101,
                available: 100
            })
        );
    }

    #[test]
    fn test_zero_transfer_succeeds() {
        let mut token = token();
        token.unpause("sale").unwrap();
        assert!(token.transfer("nobody", "bob", 0).is_ok());
        assert_eq!(token.balance_of("bob"), 0);
    }

    #[test]
    fn test_pause_toggle() {
        let mut token = token();
        assert!(token.pause("sale").is_err());
        token.unpause("sale").unwrap();
        assert!(!token.paused());
        assert!(token.unpause("sale").is_err());
        token.pause("sale").unwrap();
        assert!(token.paused());
    }
}
