//! Records emitted by the sale

use nnbu_core::{Address, Amount};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SaleEvent {
    TokenPurchase {
        purchaser: Address,
        beneficiary: Address,
        value: Amount,
        tokens: Amount,
    },
    TokenRateChanged {
        previous: Amount,
        current: Amount,
    },
    PrivateInvestorTokenPurchase {
        investor: Address,
        tokens: Amount,
    },
    MintedTokensFor {
        investor: Address,
        tokens: Amount,
    },
    TeamWalletChanged {
        wallet: Address,
    },
    SalePaused,
    SaleUnpaused,
    Finalized {
        team_wallet: Address,
        team_tokens: Amount,
    },
}

impl SaleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SaleEvent::TokenPurchase { .. } => "TokenPurchase",
            SaleEvent::TokenRateChanged { .. } => "TokenRateChanged",
            SaleEvent::PrivateInvestorTokenPurchase { .. } => "PrivateInvestorTokenPurchase",
            SaleEvent::MintedTokensFor { .. } => "MintedTokensFor",
            SaleEvent::TeamWalletChanged { .. } => "TeamWalletChanged",
            SaleEvent::SalePaused => "SalePaused",
            SaleEvent::SaleUnpaused => "SaleUnpaused",
            SaleEvent::Finalized { .. } => "Finalized",
        }
    }
}
