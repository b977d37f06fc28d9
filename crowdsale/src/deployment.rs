//! Deployed sale and its collaborators
//!
//! Owns every record the sale touches (token, whitelist, payment balances,
//! team reserves) and reads the clock once per call. Payments are settled
//! here: the caller must cover the attached value up front, only the
//! forwarded portion moves to the sale wallet, and a capped-out remainder
//! never leaves the caller.

use log::info;
use nnbu_core::{
    contract_address, Address, Amount, CallContext, Clock, NativeBalances, Token, TokenLedger,
    Timestamp, Whitelist,
};
use nnbu_reserve::TeamReserve;
use std::collections::BTreeMap;

use crate::config::CrowdsaleConfig;
use crate::crowdsale::{Crowdsale, PurchaseReceipt};
use crate::error::{Result, SaleError};

pub struct Deployment<C: Clock> {
    clock: C,
    owner: Address,
    nonce: u64,
    funds: NativeBalances,
    whitelist: Whitelist,
    crowdsale: Crowdsale<Token>,
    reserves: BTreeMap<Address, TeamReserve>,
}

impl<C: Clock> Deployment<C> {
    /// Deploy the whitelist at `config.whitelist` and the sale (with its
    /// token) at an address derived from `owner`.
    pub fn deploy(clock: C, owner: impl Into<Address>, config: CrowdsaleConfig) -> Result<Self> {
        let owner = owner.into();
        let ctx = CallContext::new(owner.clone(), clock.now());

        let whitelist = Whitelist::new(config.whitelist.clone(), owner.clone());
        let crowdsale = Crowdsale::new(&ctx, contract_address(&owner, 0), config)?;

        info!(
            "Sale deployed: crowdsale {}, token {}, whitelist {}",
            crowdsale.address(),
            crowdsale.token().address(),
            whitelist.address()
        );

        Ok(Self {
            clock,
            owner,
            nonce: 1,
            funds: NativeBalances::new(),
            whitelist,
            crowdsale,
            reserves: BTreeMap::new(),
        })
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn crowdsale(&self) -> &Crowdsale<Token> {
        &self.crowdsale
    }

    pub fn token(&self) -> &Token {
        self.crowdsale.token()
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    pub fn funds(&self) -> &NativeBalances {
        &self.funds
    }

    pub fn reserve(&self, address: &str) -> Option<&TeamReserve> {
        self.reserves.get(address)
    }

    pub fn reserves(&self) -> impl Iterator<Item = &TeamReserve> {
        self.reserves.values()
    }

    pub fn token_balance(&self, address: &str) -> Amount {
        self.token().balance_of(address)
    }

    pub fn native_balance(&self, address: &str) -> Amount {
        self.funds.balance_of(address)
    }

    fn context(&self, caller: &str) -> CallContext {
        CallContext::new(caller, self.clock.now())
    }

    /// Give an account spendable payment currency
    pub fn fund(&mut self, address: &str, amount: Amount) -> Result<()> {
        Ok(self.funds.credit(address, amount)?)
    }

    pub fn add_to_whitelist(&mut self, caller: &str, addresses: &[Address]) -> Result<()> {
        let ctx = self.context(caller);
        Ok(self.whitelist.add_to_whitelist(&ctx, addresses)?)
    }

    pub fn remove_from_whitelist(&mut self, caller: &str, addresses: &[Address]) -> Result<()> {
        let ctx = self.context(caller);
        Ok(self.whitelist.remove_from_whitelist(&ctx, addresses)?)
    }

    pub fn buy_tokens(
        &mut self,
        caller: &str,
        beneficiary: &str,
        value: Amount,
    ) -> Result<PurchaseReceipt> {
        let ctx = self.context(caller).with_value(value);
        self.funds.ensure_funds(caller, value)?;

        let receipt = self.crowdsale.buy_tokens(&ctx, beneficiary, &self.whitelist)?;
        let wallet = self.crowdsale.wallet().to_string();
        self.funds.transfer(caller, &wallet, receipt.forwarded)?;
        Ok(receipt)
    }

    pub fn set_rate(&mut self, caller: &str, rate: Amount) -> Result<()> {
        let ctx = self.context(caller);
        self.crowdsale.set_rate(&ctx, rate)
    }

    pub fn set_team_wallet_address(&mut self, caller: &str, wallet: &str) -> Result<()> {
        let ctx = self.context(caller);
        self.crowdsale.set_team_wallet_address(&ctx, wallet)
    }

    pub fn pause_sale(&mut self, caller: &str) -> Result<()> {
        let ctx = self.context(caller);
        self.crowdsale.pause(&ctx)
    }

    pub fn unpause_sale(&mut self, caller: &str) -> Result<()> {
        let ctx = self.context(caller);
        self.crowdsale.unpause(&ctx)
    }

    pub fn mint_for_private_investor(
        &mut self,
        caller: &str,
        beneficiary: &str,
        amount: Amount,
    ) -> Result<()> {
        let ctx = self.context(caller);
        self.crowdsale.mint_for_private_investor(&ctx, beneficiary, amount)
    }

    pub fn mint_tokens_for(&mut self, caller: &str, beneficiary: &str, amount: Amount) -> Result<()> {
        let ctx = self.context(caller);
        self.crowdsale.mint_tokens_for(&ctx, beneficiary, amount)
    }

    pub fn finalize(&mut self, caller: &str) -> Result<Amount> {
        let ctx = self.context(caller);
        self.crowdsale.finalize(&ctx)
    }

    /// Deploy a team reserve owned by `caller` that vests to `beneficiary`
    pub fn deploy_team_reserve(&mut self, caller: &str, beneficiary: &str) -> Result<Address> {
        let ctx = self.context(caller);
        let address = contract_address(caller, self.nonce);
        let reserve = TeamReserve::new(&ctx, address.clone(), self.token().address(), beneficiary)?;

        self.nonce += 1;
        self.reserves.insert(address.clone(), reserve);
        Ok(address)
    }

    pub fn unlock_reserve(&mut self, caller: &str, reserve: &str) -> Result<Amount> {
        let ctx = self.context(caller);
        let team_reserve = self
            .reserves
            .get_mut(reserve)
            .ok_or_else(|| SaleError::UnknownReserve(reserve.to_string()))?;
        Ok(team_reserve.unlock(&ctx, self.crowdsale.token_mut())?)
    }

    pub fn kill_reserve(&mut self, caller: &str, reserve: &str) -> Result<Amount> {
        let ctx = self.context(caller);
        let team_reserve = self
            .reserves
            .get_mut(reserve)
            .ok_or_else(|| SaleError::UnknownReserve(reserve.to_string()))?;
        Ok(team_reserve.kill(&ctx, self.crowdsale.token_mut())?)
    }
}
