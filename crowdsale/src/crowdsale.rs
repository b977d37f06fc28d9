//! Crowdsale state machine
//!
//! Phases follow the clock: `NotStarted -> PreSale -> PublicSale -> Ended`,
//! and `Finalized` is entered only through [`Crowdsale::finalize`]. Every
//! operation validates completely before its first ledger write, so a
//! rejected call leaves no trace.

use log::{debug, info, warn};
use nnbu_core::{
    contract_address, ensure_address, Address, Amount, CallContext, LedgerError, PauseState,
    Timestamp, Token, TokenLedger, WhitelistRegistry,
};
use nnbu_economics::{
    EconomicsError, EffectiveRate, SalePhase, SaleSchedule, SupplyCaps, SupplyStats,
};
use serde::{Deserialize, Serialize};

use crate::config::CrowdsaleConfig;
use crate::error::{Result, SaleError};
use crate::events::SaleEvent;

/// One-way finalization flag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SaleStatus {
    Active,
    Finalized,
}

/// Unspent payment owed to the purchaser whose order hit the cap.
/// Single slot: the most recent capped purchase wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Remainder {
    pub purchaser: Address,
    pub amount: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrowdsaleState {
    pub rate: Amount,
    pub team_wallet: Option<Address>,
    pub status: SaleStatus,
    pub pause: PauseState,
    pub remainder: Option<Remainder>,
    pub funds_raised: Amount,
}

/// How a purchase's payment is routed
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub purchaser: Address,
    pub beneficiary: Address,
    pub tokens: Amount,
    /// Sent on to the sale wallet
    pub forwarded: Amount,
    /// Returned to the purchaser when the cap cut the order short
    pub refunded: Amount,
}

impl PurchaseReceipt {
    pub fn was_capped(&self) -> bool {
        self.refunded > 0
    }
}

#[derive(Debug, Clone)]
pub struct Crowdsale<T: TokenLedger = Token> {
    address: Address,
    owner: Address,
    config: CrowdsaleConfig,
    state: CrowdsaleState,
    token: T,
    events: Vec<SaleEvent>,
}

impl Crowdsale<Token> {
    /// Deploy the sale at `address` together with its own BABY token,
    /// which starts paused and is owned by the sale.
    pub fn new(ctx: &CallContext, address: impl Into<Address>, config: CrowdsaleConfig) -> Result<Self> {
        let address = address.into();
        let token = Token::new(contract_address(&address, 0), address.clone())
            .with_cap(config.caps.total_tokens_supply);
        Self::with_token(ctx, address, config, token)
    }
}

impl<T: TokenLedger> Crowdsale<T> {
    /// Deploy the sale around an existing ledger the sale is allowed to mint on
    pub fn with_token(
        ctx: &CallContext,
        address: impl Into<Address>,
        config: CrowdsaleConfig,
        token: T,
    ) -> Result<Self> {
        let address = address.into();
        ensure_address(&address, "crowdsale address")
            .map_err(|e| SaleError::InvalidParameter(e.to_string()))?;
        ensure_address(&ctx.caller, "owner")
            .map_err(|e| SaleError::InvalidParameter(e.to_string()))?;
        config.validate()?;

        info!(
            "Crowdsale {} deployed by {}: sale [{}, {}], rate {}",
            address, ctx.caller, config.start_time, config.end_time, config.rate
        );

        Ok(Self {
            address,
            owner: ctx.caller.clone(),
            state: CrowdsaleState {
                rate: config.rate,
                team_wallet: None,
                status: SaleStatus::Active,
                pause: PauseState::Running,
                remainder: None,
                funds_raised: 0,
            },
            config,
            token,
            events: Vec::new(),
        })
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn config(&self) -> &CrowdsaleConfig {
        &self.config
    }

    pub fn state(&self) -> &CrowdsaleState {
        &self.state
    }

    pub fn rate(&self) -> Amount {
        self.state.rate
    }

    pub fn whitelist(&self) -> &str {
        &self.config.whitelist
    }

    pub fn wallet(&self) -> &str {
        &self.config.wallet
    }

    pub fn team_wallet(&self) -> Option<&str> {
        self.state.team_wallet.as_deref()
    }

    pub fn remainder_purchaser(&self) -> Option<&str> {
        self.state.remainder.as_ref().map(|r| r.purchaser.as_str())
    }

    pub fn remainder_amount(&self) -> Amount {
        self.state.remainder.as_ref().map_or(0, |r| r.amount)
    }

    pub fn funds_raised(&self) -> Amount {
        self.state.funds_raised
    }

    pub fn caps(&self) -> &SupplyCaps {
        &self.config.caps
    }

    pub fn total_tokens_supply(&self) -> Amount {
        self.config.caps.total_tokens_supply
    }

    pub fn total_tokens_for_crowdsale(&self) -> Amount {
        self.config.caps.total_tokens_for_crowdsale
    }

    pub fn pre_crowdsale_cap(&self) -> Amount {
        self.config.caps.pre_crowdsale_cap
    }

    pub fn supply_stats(&self) -> SupplyStats {
        self.config.caps.stats(self.token.total_supply())
    }

    pub fn schedule(&self) -> SaleSchedule {
        self.config.schedule()
    }

    pub fn is_finalized(&self) -> bool {
        self.state.status == SaleStatus::Finalized
    }

    pub fn is_paused(&self) -> bool {
        self.state.pause == PauseState::Paused
    }

    /// Phase at `now`, with finalization layered over the schedule
    pub fn phase(&self, now: Timestamp) -> SalePhase {
        if self.is_finalized() {
            SalePhase::Finalized
        } else {
            self.schedule().phase_at(now)
        }
    }

    /// Rate a purchase at `now` would get, if the window is open
    pub fn effective_rate(&self, now: Timestamp) -> Result<Option<EffectiveRate>> {
        Ok(EffectiveRate::at(
            &self.schedule(),
            self.state.rate,
            self.config.presale_bonus_percent,
            now,
        )?)
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    pub(crate) fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    pub fn events(&self) -> &[SaleEvent] {
        &self.events
    }

    fn only_owner(&self, ctx: &CallContext, action: &str) -> Result<()> {
        if ctx.caller != self.owner {
            warn!("{} rejected for non-owner {}", action, ctx.caller);
            return Err(SaleError::Unauthorized(format!(
                "only the owner may {}",
                action
            )));
        }
        Ok(())
    }

    fn emit(&mut self, event: SaleEvent) {
        debug!("{} emitted {:?}", self.address, event);
        self.events.push(event);
    }

    // ---------------------------------------------------------------------
    // Owner operations
    // ---------------------------------------------------------------------

    pub fn set_rate(&mut self, ctx: &CallContext, new_rate: Amount) -> Result<()> {
        self.only_owner(ctx, "set the rate")?;
        if new_rate == 0 {
            return Err(SaleError::InvalidRate);
        }

        let previous = self.state.rate;
        self.state.rate = new_rate;
        info!("Rate changed from {} to {}", previous, new_rate);
        self.emit(SaleEvent::TokenRateChanged {
            previous,
            current: new_rate,
        });
        Ok(())
    }

    pub fn set_team_wallet_address(&mut self, ctx: &CallContext, wallet: &str) -> Result<()> {
        self.only_owner(ctx, "set the team wallet")?;
        if self.is_finalized() {
            return Err(SaleError::AlreadyFinalized);
        }
        ensure_address(wallet, "team wallet")
            .map_err(|e| SaleError::InvalidParameter(e.to_string()))?;

        self.state.team_wallet = Some(wallet.to_string());
        self.emit(SaleEvent::TeamWalletChanged {
            wallet: wallet.to_string(),
        });
        Ok(())
    }

    pub fn pause(&mut self, ctx: &CallContext) -> Result<()> {
        self.only_owner(ctx, "pause the sale")?;
        if self.is_paused() {
            return Err(SaleError::InvalidParameter(
                "sale is already paused".to_string(),
            ));
        }
        self.state.pause = PauseState::Paused;
        info!("Sale paused at {}", ctx.now);
        self.emit(SaleEvent::SalePaused);
        Ok(())
    }

    pub fn unpause(&mut self, ctx: &CallContext) -> Result<()> {
        self.only_owner(ctx, "unpause the sale")?;
        if !self.is_paused() {
            return Err(SaleError::InvalidParameter("sale is not paused".to_string()));
        }
        self.state.pause = PauseState::Running;
        info!("Sale resumed at {}", ctx.now);
        self.emit(SaleEvent::SaleUnpaused);
        Ok(())
    }

    /// Mint to a private investor before the sale opens, within the
    /// pre-crowdsale cap.
    pub fn mint_for_private_investor(
        &mut self,
        ctx: &CallContext,
        beneficiary: &str,
        amount: Amount,
    ) -> Result<()> {
        self.only_owner(ctx, "mint for private investors")?;
        if ctx.now >= self.config.start_time {
            return Err(SaleError::NotBeforeSaleStart);
        }
        ensure_address(beneficiary, "investor")
            .map_err(|e| SaleError::InvalidParameter(e.to_string()))?;
        if amount == 0 {
            return Err(SaleError::InvalidParameter(
                "amount must be greater than zero".to_string(),
            ));
        }

        let available = self.config.caps.remaining_before_sale(self.token.total_supply());
        if amount > available {
            return Err(SaleError::CapExceeded {
                requested: amount,
                available,
            });
        }

        self.token.mint(&self.address, beneficiary, amount)?;
        info!("Minted {} to private investor {}", amount, beneficiary);
        self.emit(SaleEvent::PrivateInvestorTokenPurchase {
            investor: beneficiary.to_string(),
            tokens: amount,
        });
        Ok(())
    }

    /// Manual allocation once the sale window has closed and before
    /// finalization, bounded by the total supply.
    pub fn mint_tokens_for(
        &mut self,
        ctx: &CallContext,
        beneficiary: &str,
        amount: Amount,
    ) -> Result<()> {
        self.only_owner(ctx, "mint tokens")?;
        if self.is_finalized() {
            return Err(SaleError::AlreadyFinalized);
        }
        if !self.schedule().has_ended(ctx.now) {
            return Err(SaleError::NotEnded);
        }
        ensure_address(beneficiary, "beneficiary")
            .map_err(|e| SaleError::InvalidParameter(e.to_string()))?;
        if amount == 0 {
            return Err(SaleError::InvalidParameter(
                "amount must be greater than zero".to_string(),
            ));
        }

        let available = self.config.caps.remaining_total(self.token.total_supply());
        if amount > available {
            return Err(SaleError::CapExceeded {
                requested: amount,
                available,
            });
        }

        self.token.mint(&self.address, beneficiary, amount)?;
        info!("Minted {} for {}", amount, beneficiary);
        self.emit(SaleEvent::MintedTokensFor {
            investor: beneficiary.to_string(),
            tokens: amount,
        });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Purchases
    // ---------------------------------------------------------------------

    /// Buy tokens for `beneficiary` with `ctx.value`.
    ///
    /// When the order would overshoot the crowdsale cap only the remaining
    /// tokens are minted; the matching payment is forwarded and the rest is
    /// recorded as the remainder owed back to the purchaser.
    pub fn buy_tokens<W: WhitelistRegistry + ?Sized>(
        &mut self,
        ctx: &CallContext,
        beneficiary: &str,
        whitelist: &W,
    ) -> Result<PurchaseReceipt> {
        if ctx.caller != beneficiary {
            return Err(SaleError::NotPurchaser {
                caller: ctx.caller.clone(),
                beneficiary: beneficiary.to_string(),
            });
        }
        if self.is_paused() {
            return Err(SaleError::Paused);
        }

        let phase = self.phase(ctx.now);
        if !phase.accepts_purchases() {
            return Err(SaleError::OutsideSaleWindow {
                now: ctx.now,
                start: self.config.start_time,
                end: self.config.end_time,
            });
        }
        if !whitelist.is_whitelisted(beneficiary) {
            return Err(SaleError::NotWhitelisted(beneficiary.to_string()));
        }
        if ctx.value == 0 || ctx.value < self.config.min_contribution {
            return Err(SaleError::BelowMinimumContribution {
                provided: ctx.value,
                minimum: self.config.min_contribution,
            });
        }

        let rate = self
            .effective_rate(ctx.now)?
            .ok_or(SaleError::OutsideSaleWindow {
                now: ctx.now,
                start: self.config.start_time,
                end: self.config.end_time,
            })?;
        let requested = rate.tokens_for(ctx.value)?;
        let minted = self.token.total_supply();
        debug!(
            "{} pays {} at {:?}: {} tokens requested, {} minted so far",
            beneficiary, ctx.value, rate, requested, minted
        );

        let caps = self.config.caps;
        if phase == SalePhase::PreSale && requested > caps.remaining_before_sale(minted) {
            return Err(SaleError::CapExceeded {
                requested,
                available: caps.remaining_before_sale(minted),
            });
        }

        let available = caps.remaining_for_crowdsale(minted);
        if available == 0 {
            return Err(SaleError::CapExceeded {
                requested,
                available,
            });
        }

        let (tokens, forwarded) = if requested > available {
            (available, rate.payment_for(available)?.min(ctx.value))
        } else {
            (requested, ctx.value)
        };
        let refunded = ctx.value - forwarded;
        let funds_raised = self
            .state
            .funds_raised
            .checked_add(forwarded)
            .ok_or(EconomicsError::Overflow)?;

        self.token.mint(&self.address, beneficiary, tokens)?;

        self.state.funds_raised = funds_raised;
        if requested > available {
            warn!(
                "Crowdsale cap reached: {} receives {} of {} tokens, {} owed back",
                beneficiary, tokens, requested, refunded
            );
            self.state.remainder = Some(Remainder {
                purchaser: beneficiary.to_string(),
                amount: refunded,
            });
        } else if self
            .state
            .remainder
            .as_ref()
            .is_some_and(|r| r.purchaser != beneficiary)
        {
            self.state.remainder = None;
        }

        info!("{} bought {} tokens for {}", beneficiary, tokens, forwarded);
        self.emit(SaleEvent::TokenPurchase {
            purchaser: ctx.caller.clone(),
            beneficiary: beneficiary.to_string(),
            value: ctx.value,
            tokens,
        });

        Ok(PurchaseReceipt {
            purchaser: ctx.caller.clone(),
            beneficiary: beneficiary.to_string(),
            tokens,
            forwarded,
            refunded,
        })
    }

    // ---------------------------------------------------------------------
    // Finalization
    // ---------------------------------------------------------------------

    /// Close the sale: mint the team allocation (reserve share plus unsold
    /// crowdsale tokens) to the team wallet, stop minting for good and
    /// release token transfers. Callable by anyone after the end time.
    pub fn finalize(&mut self, ctx: &CallContext) -> Result<Amount> {
        if self.is_finalized() {
            return Err(SaleError::AlreadyFinalized);
        }
        if !self.schedule().has_ended(ctx.now) {
            return Err(SaleError::NotEnded);
        }
        let team_wallet = self.state.team_wallet.clone().ok_or_else(|| {
            SaleError::InvalidParameter("team wallet must be set before finalizing".to_string())
        })?;
        if self.token.minting_finished() {
            return Err(LedgerError::MintingFinished.into());
        }

        let team_tokens = self.config.caps.team_allocation(self.token.total_supply());
        if team_tokens > 0 {
            self.token.mint(&self.address, &team_wallet, team_tokens)?;
        }
        self.token.finish_minting(&self.address)?;
        if self.token.paused() {
            self.token.unpause(&self.address)?;
        }

        self.state.status = SaleStatus::Finalized;
        info!(
            "Crowdsale finalized: {} tokens to team wallet {}, {} raised",
            team_tokens, team_wallet, self.state.funds_raised
        );
        self.emit(SaleEvent::Finalized {
            team_wallet,
            team_tokens,
        });
        Ok(team_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nnbu_core::{Whitelist, SECONDS_PER_DAY, TOKEN_UNIT};
    use nnbu_economics::constants::{TEAM_RESERVE, TOTAL_TOKENS_FOR_CROWDSALE};

    const T: Timestamp = 1_700_000_000;
    const DAY: Timestamp = SECONDS_PER_DAY;

    fn start() -> Timestamp {
        T + 20
    }

    fn end() -> Timestamp {
        start() + 60 * DAY
    }

    fn owner_at(now: Timestamp) -> CallContext {
        CallContext::new("owner", now)
    }

    fn buyer_at(now: Timestamp, value: Amount) -> CallContext {
        CallContext::new("buyer", now).with_value(value)
    }

    fn whitelist() -> Whitelist {
        let mut whitelist = Whitelist::new("whitelist", "owner");
        whitelist
            .add_to_whitelist(&owner_at(T), &["buyer".to_string(), "buyer2".to_string()])
            .unwrap();
        whitelist
    }

    fn sale(rate: Amount, presale: bool) -> Crowdsale {
        let presale_end = presale.then(|| start() + 20 * DAY);
        let config = CrowdsaleConfig::new(start(), presale_end, end(), "whitelist", rate, "wallet");
        Crowdsale::new(&owner_at(T), "crowdsale", config).unwrap()
    }

    #[test]
    fn test_deployment_state() {
        let sale = sale(50, true);
        assert_eq!(sale.rate(), 50);
        assert_eq!(sale.whitelist(), "whitelist");
        assert_eq!(sale.wallet(), "wallet");
        assert_eq!(sale.owner(), "owner");
        assert!(sale.token().paused());
        assert_eq!(sale.token().owner(), "crowdsale");
        assert_eq!(sale.remainder_purchaser(), None);
        assert_eq!(sale.remainder_amount(), 0);
        assert_eq!(sale.phase(T), SalePhase::NotStarted);
    }

    #[test]
    fn test_set_rate() {
        let mut sale = sale(50, false);

        let result = sale.set_rate(&CallContext::new("buyer", T), 60);
        assert!(matches!(result, Err(SaleError::Unauthorized(_))));
        assert_eq!(sale.rate(), 50);

        assert_eq!(sale.set_rate(&owner_at(T), 0), Err(SaleError::InvalidRate));
        assert_eq!(sale.rate(), 50);

        sale.set_rate(&owner_at(T), 60).unwrap();
        assert_eq!(sale.rate(), 60);
        assert_eq!(
            sale.events().last(),
            Some(&SaleEvent::TokenRateChanged {
                previous: 50,
                current: 60
            })
        );
    }

    #[test]
    fn test_public_purchase() {
        let mut sale = sale(50, false);
        let receipt = sale
            .buy_tokens(&buyer_at(T + DAY, TOKEN_UNIT), "buyer", &whitelist())
            .unwrap();

        assert_eq!(receipt.tokens, 50 * TOKEN_UNIT);
        assert_eq!(receipt.forwarded, TOKEN_UNIT);
        assert_eq!(receipt.refunded, 0);
        assert_eq!(sale.token().balance_of("buyer"), 50 * TOKEN_UNIT);
        assert_eq!(sale.funds_raised(), TOKEN_UNIT);
    }

    #[test]
    fn test_presale_purchase_gets_bonus() {
        let mut sale = sale(50, true);
        sale.buy_tokens(&buyer_at(T + DAY, TOKEN_UNIT), "buyer", &whitelist())
            .unwrap();
        assert_eq!(sale.token().balance_of("buyer"), 80 * TOKEN_UNIT);
    }

    #[test]
    fn test_purchase_rejections_in_order() {
        let mut sale = sale(50, false);
        let whitelist = whitelist();
        let now = T + DAY;

        // Proxy purchase
        let result = sale.buy_tokens(&CallContext::new("owner", now).with_value(TOKEN_UNIT), "buyer", &whitelist);
        assert!(matches!(result, Err(SaleError::NotPurchaser { .. })));

        // Not whitelisted
        let result = sale.buy_tokens(&CallContext::new("user1", now).with_value(TOKEN_UNIT), "user1", &whitelist);
        assert_eq!(result, Err(SaleError::NotWhitelisted("user1".to_string())));

        // Below minimum
        let result = sale.buy_tokens(&buyer_at(now, TOKEN_UNIT / 10), "buyer", &whitelist);
        assert!(matches!(result, Err(SaleError::BelowMinimumContribution { .. })));

        // Before start and after end
        let result = sale.buy_tokens(&buyer_at(T, TOKEN_UNIT), "buyer", &whitelist);
        assert!(matches!(result, Err(SaleError::OutsideSaleWindow { .. })));
        let result = sale.buy_tokens(&buyer_at(T + 61 * DAY, TOKEN_UNIT), "buyer", &whitelist);
        assert!(matches!(result, Err(SaleError::OutsideSaleWindow { .. })));

        assert_eq!(sale.token().total_supply(), 0);
        assert!(sale.events().is_empty());
    }

    #[test]
    fn test_zero_payment_rejected_without_minimum() {
        let config = CrowdsaleConfig::new(start(), None, end(), "whitelist", 50, "wallet")
            .with_min_contribution(0);
        let mut sale = Crowdsale::new(&owner_at(T), "crowdsale", config).unwrap();

        let result = sale.buy_tokens(&buyer_at(T + DAY, 0), "buyer", &whitelist());
        assert!(matches!(result, Err(SaleError::BelowMinimumContribution { .. })));

        sale.buy_tokens(&buyer_at(T + DAY, 1), "buyer", &whitelist())
            .unwrap();
        assert_eq!(sale.token().balance_of("buyer"), 50);
    }

    #[test]
    fn test_paused_sale_rejects_purchases() {
        let mut sale = sale(50, false);
        sale.pause(&owner_at(T)).unwrap();

        let result = sale.buy_tokens(&buyer_at(T + DAY, TOKEN_UNIT), "buyer", &whitelist());
        assert_eq!(result, Err(SaleError::Paused));
        assert_eq!(sale.token().balance_of("buyer"), 0);

        sale.unpause(&owner_at(T + DAY)).unwrap();
        sale.buy_tokens(&buyer_at(T + DAY, TOKEN_UNIT), "buyer", &whitelist())
            .unwrap();
        assert_eq!(sale.token().balance_of("buyer"), 50 * TOKEN_UNIT);
    }

    #[test]
    fn test_cap_reached_records_remainder() {
        let mut sale = sale(52_500_000, false);
        let whitelist = whitelist();

        let receipt = sale
            .buy_tokens(&buyer_at(T + 30 * DAY, 2 * TOKEN_UNIT), "buyer", &whitelist)
            .unwrap();

        assert_eq!(receipt.tokens, TOTAL_TOKENS_FOR_CROWDSALE);
        assert_eq!(receipt.forwarded, TOKEN_UNIT);
        assert_eq!(receipt.refunded, TOKEN_UNIT);
        assert!(receipt.was_capped());
        assert_eq!(sale.token().balance_of("buyer"), TOTAL_TOKENS_FOR_CROWDSALE);
        assert_eq!(sale.remainder_purchaser(), Some("buyer"));
        assert_eq!(sale.remainder_amount(), TOKEN_UNIT);

        let result = sale.buy_tokens(&buyer_at(T + 30 * DAY, TOKEN_UNIT), "buyer", &whitelist);
        assert!(matches!(result, Err(SaleError::CapExceeded { available: 0, .. })));

        let other = CallContext::new("buyer2", T + 30 * DAY).with_value(TOKEN_UNIT);
        let result = sale.buy_tokens(&other, "buyer2", &whitelist);
        assert!(matches!(result, Err(SaleError::CapExceeded { .. })));
    }

    #[test]
    fn test_remainder_survives_rejected_purchases() {
        let caps = SupplyCaps::new(1_000 * TOKEN_UNIT, 100 * TOKEN_UNIT, 0).unwrap();
        let config = CrowdsaleConfig::new(start(), None, end(), "whitelist", 50, "wallet")
            .with_caps(caps);
        let mut sale = Crowdsale::new(&owner_at(T), "crowdsale", config).unwrap();
        let whitelist = whitelist();
        let now = T + DAY;

        // 3 units would buy 150; only 100 fit
        let receipt = sale
            .buy_tokens(&buyer_at(now, 3 * TOKEN_UNIT), "buyer", &whitelist)
            .unwrap();
        assert_eq!(receipt.tokens, 100 * TOKEN_UNIT);
        assert_eq!(receipt.forwarded, 2 * TOKEN_UNIT);
        assert_eq!(sale.remainder_amount(), TOKEN_UNIT);

        let other = CallContext::new("buyer2", now).with_value(TOKEN_UNIT);
        assert!(sale.buy_tokens(&other, "buyer2", &whitelist).is_err());
        assert_eq!(sale.remainder_purchaser(), Some("buyer"));
        assert_eq!(sale.remainder_amount(), TOKEN_UNIT);
    }

    #[test]
    fn test_capped_payment_rounds_up() {
        // 7 tokens left at 2 per unit: 4 units are charged, 1 of 5 refunded
        let caps = SupplyCaps::new(7, 7, 0).unwrap();
        let config = CrowdsaleConfig::new(start(), None, end(), "whitelist", 2, "wallet")
            .with_caps(caps)
            .with_min_contribution(0);
        let mut sale = Crowdsale::new(&owner_at(T), "crowdsale", config).unwrap();

        let receipt = sale
            .buy_tokens(&buyer_at(T + DAY, 5), "buyer", &whitelist())
            .unwrap();
        assert_eq!(receipt.tokens, 7);
        assert_eq!(receipt.forwarded, 4);
        assert_eq!(receipt.refunded, 1);
        assert_eq!(sale.remainder_amount(), 1);
    }

    #[test]
    fn test_presale_cap_blocks_oversized_order() {
        let mut sale = sale(52_500_000, true);
        let result = sale.buy_tokens(&buyer_at(T + DAY, TOKEN_UNIT), "buyer", &whitelist());
        assert!(matches!(result, Err(SaleError::CapExceeded { .. })));
        assert_eq!(sale.token().balance_of("buyer"), 0);
        assert_eq!(sale.remainder_purchaser(), None);
    }

    #[test]
    fn test_private_investor_minting() {
        let mut sale = sale(50, false);

        let result = sale.mint_for_private_investor(&CallContext::new("buyer", T), "buyer", 10 * TOKEN_UNIT);
        assert!(matches!(result, Err(SaleError::Unauthorized(_))));

        let cap = sale.pre_crowdsale_cap();
        let result = sale.mint_for_private_investor(&owner_at(T), "buyer", cap + 10 * TOKEN_UNIT);
        assert!(matches!(result, Err(SaleError::CapExceeded { .. })));

        sale.mint_for_private_investor(&owner_at(T), "buyer", 1).unwrap();
        assert_eq!(sale.token().balance_of("buyer"), 1);
        assert_eq!(
            sale.events().last().map(SaleEvent::name),
            Some("PrivateInvestorTokenPurchase")
        );

        let result = sale.mint_for_private_investor(&owner_at(start()), "buyer", 1);
        assert_eq!(result, Err(SaleError::NotBeforeSaleStart));
    }

    #[test]
    fn test_post_sale_manual_minting() {
        let mut sale = sale(50, true);

        let result = sale.mint_tokens_for(&owner_at(T + 50), "buyer", 1);
        assert_eq!(result, Err(SaleError::NotEnded));

        let after = end() + 5 * DAY;
        let result = sale.mint_tokens_for(&CallContext::new("buyer", after), "buyer", 1);
        assert!(matches!(result, Err(SaleError::Unauthorized(_))));

        let result = sale.mint_tokens_for(&owner_at(after), "buyer", sale.total_tokens_supply() + 1);
        assert!(matches!(result, Err(SaleError::CapExceeded { .. })));

        sale.mint_tokens_for(&owner_at(after), "buyer", 1).unwrap();
        assert_eq!(sale.token().balance_of("buyer"), 1);
        assert_eq!(sale.events().last().map(SaleEvent::name), Some("MintedTokensFor"));
    }

    #[test]
    fn test_finalize() {
        let mut sale = sale(52_500_000, false);
        sale.buy_tokens(&buyer_at(T + 42 * DAY, TOKEN_UNIT), "buyer", &whitelist())
            .unwrap();

        assert_eq!(sale.finalize(&owner_at(T + 50 * DAY)), Err(SaleError::NotEnded));
        assert!(matches!(
            sale.finalize(&owner_at(end() + 1)),
            Err(SaleError::InvalidParameter(_))
        ));

        sale.set_team_wallet_address(&owner_at(end()), "reserve").unwrap();
        let team_tokens = sale.finalize(&CallContext::new("anyone", end() + 1)).unwrap();

        assert_eq!(team_tokens, TEAM_RESERVE);
        assert_eq!(sale.token().balance_of("reserve"), TEAM_RESERVE);
        assert!(!sale.token().paused());
        assert!(sale.token().minting_finished());
        assert!(sale.is_finalized());
        assert_eq!(sale.phase(end() + 1), SalePhase::Finalized);

        let supply = sale.token().total_supply();
        assert_eq!(
            sale.finalize(&owner_at(end() + 2)),
            Err(SaleError::AlreadyFinalized)
        );
        assert_eq!(sale.token().total_supply(), supply);

        assert_eq!(
            sale.set_team_wallet_address(&owner_at(end() + 2), "other"),
            Err(SaleError::AlreadyFinalized)
        );
    }

    #[test]
    fn test_finalize_gives_unsold_tokens_to_team() {
        let mut sale = sale(50, false);
        sale.buy_tokens(&buyer_at(T + DAY, TOKEN_UNIT), "buyer", &whitelist())
            .unwrap();
        sale.set_team_wallet_address(&owner_at(T), "reserve").unwrap();

        let team_tokens = sale.finalize(&owner_at(end() + 1)).unwrap();
        assert_eq!(team_tokens, sale.total_tokens_supply() - 50 * TOKEN_UNIT);
        assert_eq!(sale.token().total_supply(), sale.total_tokens_supply());
    }
}
