//! Sale deployment file
//!
//! ```toml
//! [sale]
//! owner = "0xowner"
//! start_time = 1700000020
//! presale_end_time = 1701728020
//! end_time = 1705184020
//! rate = 50
//! wallet = "0xwallet"
//!
//! [whitelist]
//! address = "0xwhitelist"
//! members = ["0xbuyer"]
//! ```
//!
//! Caps are written in whole tokens; the minimum contribution is in base
//! units of the payment currency.

use anyhow::{Context, Result};
use nnbu_core::{Address, Amount, Timestamp, TOKEN_UNIT};
use nnbu_crowdsale::constants::{
    MIN_CONTRIBUTION, PRESALE_BONUS_PERCENT, PRE_CROWDSALE_CAP, TOTAL_TOKENS_FOR_CROWDSALE,
    TOTAL_TOKENS_SUPPLY,
};
use nnbu_crowdsale::CrowdsaleConfig;
use nnbu_economics::SupplyCaps;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct SaleFile {
    pub sale: SaleSection,
    #[serde(default)]
    pub whitelist: WhitelistSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaleSection {
    pub owner: Address,
    pub start_time: Timestamp,
    #[serde(default)]
    pub presale_end_time: Option<Timestamp>,
    pub end_time: Timestamp,
    pub rate: u64,
    pub wallet: Address,
    #[serde(default = "default_total_supply")]
    pub total_tokens_supply: u64,
    #[serde(default = "default_crowdsale_tokens")]
    pub total_tokens_for_crowdsale: u64,
    #[serde(default = "default_pre_crowdsale_cap")]
    pub pre_crowdsale_cap: u64,
    #[serde(default = "default_bonus")]
    pub presale_bonus_percent: u32,
    #[serde(default = "default_min_contribution")]
    pub min_contribution: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhitelistSection {
    #[serde(default = "default_whitelist_address")]
    pub address: Address,
    #[serde(default)]
    pub members: Vec<Address>,
}

impl Default for WhitelistSection {
    fn default() -> Self {
        Self {
            address: default_whitelist_address(),
            members: Vec::new(),
        }
    }
}

fn whole_tokens(amount: Amount) -> u64 {
    u64::try_from(amount / TOKEN_UNIT).unwrap_or(u64::MAX)
}

fn default_total_supply() -> u64 {
    whole_tokens(TOTAL_TOKENS_SUPPLY)
}

fn default_crowdsale_tokens() -> u64 {
    whole_tokens(TOTAL_TOKENS_FOR_CROWDSALE)
}

fn default_pre_crowdsale_cap() -> u64 {
    whole_tokens(PRE_CROWDSALE_CAP)
}

fn default_bonus() -> u32 {
    PRESALE_BONUS_PERCENT
}

fn default_min_contribution() -> u64 {
    u64::try_from(MIN_CONTRIBUTION).unwrap_or(u64::MAX)
}

fn default_whitelist_address() -> Address {
    "0xwhitelist".to_string()
}

impl SaleFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid sale file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let file: SaleFile = toml::from_str(contents)?;
        file.crowdsale_config()?;
        Ok(file)
    }

    pub fn owner(&self) -> &str {
        &self.sale.owner
    }

    /// Validated sale parameters with caps scaled to base units
    pub fn crowdsale_config(&self) -> Result<CrowdsaleConfig> {
        let sale = &self.sale;
        let caps = SupplyCaps::new(
            Amount::from(sale.total_tokens_supply) * TOKEN_UNIT,
            Amount::from(sale.total_tokens_for_crowdsale) * TOKEN_UNIT,
            Amount::from(sale.pre_crowdsale_cap) * TOKEN_UNIT,
        )?;

        let config = CrowdsaleConfig::new(
            sale.start_time,
            sale.presale_end_time,
            sale.end_time,
            self.whitelist.address.clone(),
            Amount::from(sale.rate),
            sale.wallet.clone(),
        )
        .with_caps(caps)
        .with_presale_bonus(sale.presale_bonus_percent)
        .with_min_contribution(Amount::from(sale.min_contribution));

        config.validate()?;
        Ok(config)
    }
}
