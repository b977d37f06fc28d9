//! Scripted sale simulations
//!
//! A scenario is a JSON list of steps replayed against a fresh deployment
//! driven by a manual clock. Amounts are decimal strings in whole units
//! ("1", "0.5"). A reserve deployed with a `label` can be referred to by
//! that label in later steps.

use anyhow::{Context, Result};
use log::debug;
use nnbu_core::{Address, ManualClock, Timestamp, SECONDS_PER_DAY};
use nnbu_crowdsale::{Deployment, SaleError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::config::SaleFile;
use crate::units::{format_units, parse_units};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Clock at deployment; one day before the sale opens when absent
    #[serde(default)]
    pub start_at: Option<Timestamp>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Advance {
        #[serde(default)]
        days: u64,
        #[serde(default)]
        seconds: u64,
    },
    Fund {
        account: Address,
        amount: String,
    },
    Whitelist {
        #[serde(default)]
        caller: Option<Address>,
        members: Vec<Address>,
    },
    RemoveFromWhitelist {
        #[serde(default)]
        caller: Option<Address>,
        members: Vec<Address>,
    },
    Buy {
        account: Address,
        #[serde(default)]
        beneficiary: Option<Address>,
        value: String,
    },
    SetRate {
        #[serde(default)]
        caller: Option<Address>,
        rate: u64,
    },
    SetTeamWallet {
        #[serde(default)]
        caller: Option<Address>,
        wallet: Address,
    },
    PauseSale {
        #[serde(default)]
        caller: Option<Address>,
    },
    UnpauseSale {
        #[serde(default)]
        caller: Option<Address>,
    },
    MintPrivate {
        #[serde(default)]
        caller: Option<Address>,
        beneficiary: Address,
        amount: String,
    },
    MintFor {
        #[serde(default)]
        caller: Option<Address>,
        beneficiary: Address,
        amount: String,
    },
    DeployReserve {
        #[serde(default)]
        caller: Option<Address>,
        beneficiary: Address,
        #[serde(default)]
        label: Option<String>,
    },
    Finalize {
        #[serde(default)]
        caller: Option<Address>,
    },
    Unlock {
        #[serde(default)]
        caller: Option<Address>,
        reserve: Address,
    },
    Kill {
        #[serde(default)]
        caller: Option<Address>,
        reserve: Address,
    },
}

/// What happened at one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub index: usize,
    pub now: Timestamp,
    pub description: String,
    pub result: std::result::Result<String, String>,
}

impl StepOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct Simulation {
    deployment: Deployment<ManualClock>,
    labels: HashMap<String, Address>,
    outcomes: Vec<StepOutcome>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("invalid scenario {}", path.display()))
    }
}

impl Simulation {
    /// Deploy the sale described by `file` and whitelist its initial members
    pub fn deploy(file: &SaleFile, start_at: Option<Timestamp>) -> Result<Self> {
        let config = file.crowdsale_config()?;
        let now = start_at.unwrap_or_else(|| config.start_time.saturating_sub(SECONDS_PER_DAY));
        let mut deployment = Deployment::deploy(ManualClock::new(now), file.owner(), config)?;

        if !file.whitelist.members.is_empty() {
            deployment.add_to_whitelist(file.owner(), &file.whitelist.members)?;
        }

        Ok(Self {
            deployment,
            labels: HashMap::new(),
            outcomes: Vec::new(),
        })
    }

    pub fn deployment(&self) -> &Deployment<ManualClock> {
        &self.deployment
    }

    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    /// Reserve address for a label, or the input unchanged
    pub fn resolve(&self, name: &str) -> Address {
        self.labels
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Replay every step. Rejected operations are recorded, not fatal;
    /// malformed steps (bad amounts) abort the run.
    pub fn run(&mut self, scenario: &Scenario) -> Result<()> {
        for (index, step) in scenario.steps.iter().enumerate() {
            let description = describe(step);
            let result = self
                .apply(step)
                .with_context(|| format!("step {} ({})", index + 1, description))?;
            debug!("step {}: {} -> {:?}", index + 1, description, result);

            self.outcomes.push(StepOutcome {
                index: index + 1,
                now: self.deployment.now(),
                description,
                result: result.map_err(|e| e.to_string()),
            });
        }
        Ok(())
    }

    fn caller(&self, caller: &Option<Address>) -> Address {
        caller
            .clone()
            .unwrap_or_else(|| self.deployment.owner().to_string())
    }

    fn apply(&mut self, step: &Step) -> Result<std::result::Result<String, SaleError>> {
        let outcome = match step {
            Step::Advance { days, seconds } => {
                let delta = days
                    .checked_mul(SECONDS_PER_DAY)
                    .and_then(|d| d.checked_add(*seconds))
                    .context("advance overflows the clock")?;
                self.deployment.clock().advance(delta);
                Ok(format!("clock at {}", self.deployment.now()))
            }
            Step::Fund { account, amount } => {
                let amount = parse_units(amount)?;
                self.deployment
                    .fund(account, amount)
                    .map(|()| format!("{} funded with {}", account, format_units(amount)))
            }
            Step::Whitelist { caller, members } => {
                let caller = self.caller(caller);
                self.deployment
                    .add_to_whitelist(&caller, members)
                    .map(|()| format!("{} address(es) whitelisted", members.len()))
            }
            Step::RemoveFromWhitelist { caller, members } => {
                let caller = self.caller(caller);
                self.deployment
                    .remove_from_whitelist(&caller, members)
                    .map(|()| format!("{} address(es) removed", members.len()))
            }
            Step::Buy {
                account,
                beneficiary,
                value,
            } => {
                let value = parse_units(value)?;
                let beneficiary = beneficiary.as_deref().unwrap_or(account.as_str());
                self.deployment
                    .buy_tokens(account, beneficiary, value)
                    .map(|receipt| {
                        let mut message = format!(
                            "{} BABY for {} paid",
                            format_units(receipt.tokens),
                            format_units(receipt.forwarded)
                        );
                        if receipt.was_capped() {
                            message.push_str(&format!(
                                ", cap reached, {} owed back",
                                format_units(receipt.refunded)
                            ));
                        }
                        message
                    })
            }
            Step::SetRate { caller, rate } => {
                let caller = self.caller(caller);
                self.deployment
                    .set_rate(&caller, (*rate).into())
                    .map(|()| format!("rate set to {}", rate))
            }
            Step::SetTeamWallet { caller, wallet } => {
                let caller = self.caller(caller);
                let wallet = self.resolve(wallet);
                self.deployment
                    .set_team_wallet_address(&caller, &wallet)
                    .map(|()| format!("team wallet set to {}", wallet))
            }
            Step::PauseSale { caller } => {
                let caller = self.caller(caller);
                self.deployment
                    .pause_sale(&caller)
                    .map(|()| "sale paused".to_string())
            }
            Step::UnpauseSale { caller } => {
                let caller = self.caller(caller);
                self.deployment
                    .unpause_sale(&caller)
                    .map(|()| "sale resumed".to_string())
            }
            Step::MintPrivate {
                caller,
                beneficiary,
                amount,
            } => {
                let caller = self.caller(caller);
                let amount = parse_units(amount)?;
                self.deployment
                    .mint_for_private_investor(&caller, beneficiary, amount)
                    .map(|()| format!("{} BABY minted to {}", format_units(amount), beneficiary))
            }
            Step::MintFor {
                caller,
                beneficiary,
                amount,
            } => {
                let caller = self.caller(caller);
                let amount = parse_units(amount)?;
                self.deployment
                    .mint_tokens_for(&caller, beneficiary, amount)
                    .map(|()| format!("{} BABY minted to {}", format_units(amount), beneficiary))
            }
            Step::DeployReserve {
                caller,
                beneficiary,
                label,
            } => {
                let caller = self.caller(caller);
                let result = self.deployment.deploy_team_reserve(&caller, beneficiary);
                if let (Ok(address), Some(label)) = (&result, label) {
                    self.labels.insert(label.clone(), address.clone());
                }
                result.map(|address| format!("reserve {} vesting to {}", address, beneficiary))
            }
            Step::Finalize { caller } => {
                let caller = self.caller(caller);
                self.deployment
                    .finalize(&caller)
                    .map(|team| format!("finalized, {} BABY to the team", format_units(team)))
            }
            Step::Unlock { caller, reserve } => {
                let caller = self.caller(caller);
                let reserve = self.resolve(reserve);
                self.deployment
                    .unlock_reserve(&caller, &reserve)
                    .map(|amount| format!("{} BABY released", format_units(amount)))
            }
            Step::Kill { caller, reserve } => {
                let caller = self.caller(caller);
                let reserve = self.resolve(reserve);
                self.deployment
                    .kill_reserve(&caller, &reserve)
                    .map(|amount| format!("reserve killed, {} BABY reclaimed", format_units(amount)))
            }
        };
        Ok(outcome)
    }
}

fn describe(step: &Step) -> String {
    match step {
        Step::Advance { days, seconds } => format!("advance {}d {}s", days, seconds),
        Step::Fund { account, amount } => format!("fund {} with {}", account, amount),
        Step::Whitelist { members, .. } => format!("whitelist {}", members.join(", ")),
        Step::RemoveFromWhitelist { members, .. } => format!("unlist {}", members.join(", ")),
        Step::Buy { account, value, .. } => format!("{} buys for {}", account, value),
        Step::SetRate { rate, .. } => format!("set rate {}", rate),
        Step::SetTeamWallet { wallet, .. } => format!("set team wallet {}", wallet),
        Step::PauseSale { .. } => "pause sale".to_string(),
        Step::UnpauseSale { .. } => "unpause sale".to_string(),
        Step::MintPrivate {
            beneficiary, amount, ..
        } => format!("mint {} to private investor {}", amount, beneficiary),
        Step::MintFor {
            beneficiary, amount, ..
        } => format!("mint {} for {}", amount, beneficiary),
        Step::DeployReserve { beneficiary, .. } => format!("deploy reserve for {}", beneficiary),
        Step::Finalize { .. } => "finalize".to_string(),
        Step::Unlock { reserve, .. } => format!("unlock {}", reserve),
        Step::Kill { reserve, .. } => format!("kill {}", reserve),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nnbu_core::{TokenLedger, TOKEN_UNIT};

    const SALE: &str = r#"
[sale]
owner = "owner"
start_time = 1700000020
end_time = 1705184020
rate = 52500000
wallet = "wallet"

[whitelist]
members = ["buyer"]
"#;

    fn simulate(steps: &str) -> Simulation {
        let file = SaleFile::parse(SALE).unwrap();
        let scenario: Scenario =
            serde_json::from_str(&format!(r#"{{"start_at":1700000000,"steps":{}}}"#, steps))
                .unwrap();
        let mut simulation = Simulation::deploy(&file, scenario.start_at).unwrap();
        simulation.run(&scenario).unwrap();
        simulation
    }

    #[test]
    fn test_full_lifecycle() {
        let simulation = simulate(
            r#"[
                {"step":"fund","account":"buyer","amount":"10"},
                {"step":"deploy_reserve","beneficiary":"team","label":"reserve"},
                {"step":"advance","days":1},
                {"step":"buy","account":"buyer","value":"2"},
                {"step":"advance","days":70},
                {"step":"set_team_wallet","wallet":"reserve"},
                {"step":"finalize","caller":"anyone"},
                {"step":"unlock","caller":"anyone","reserve":"reserve"},
                {"step":"advance","days":370},
                {"step":"unlock","caller":"anyone","reserve":"reserve"}
            ]"#,
        );

        let outcomes = simulation.outcomes();
        assert_eq!(outcomes.len(), 10);
        assert!(outcomes[3].result.as_ref().unwrap().contains("owed back"));
        assert!(outcomes[6].succeeded());
        assert!(!outcomes[7].succeeded());
        assert!(outcomes[9].succeeded());

        let deployment = simulation.deployment();
        assert_eq!(deployment.token().balance_of("team"), 7_500_000 * TOKEN_UNIT);
        assert_eq!(deployment.native_balance("buyer"), 9 * TOKEN_UNIT);
        assert_eq!(deployment.native_balance("wallet"), TOKEN_UNIT);
    }

    #[test]
    fn test_rejections_are_recorded() {
        let simulation = simulate(
            r#"[
                {"step":"fund","account":"stranger","amount":"5"},
                {"step":"advance","days":1},
                {"step":"buy","account":"stranger","value":"1"},
                {"step":"set_rate","caller":"stranger","rate":60},
                {"step":"set_rate","rate":0}
            ]"#,
        );

        let failures: Vec<_> = simulation
            .outcomes()
            .iter()
            .filter(|o| !o.succeeded())
            .map(|o| o.index)
            .collect();
        assert_eq!(failures, vec![3, 4, 5]);
        assert_eq!(simulation.deployment().crowdsale().rate(), 52_500_000);
    }

    #[test]
    fn test_malformed_amount_aborts() {
        let file = SaleFile::parse(SALE).unwrap();
        let scenario: Scenario = serde_json::from_str(
            r#"{"steps":[{"step":"fund","account":"buyer","amount":"lots"}]}"#,
        )
        .unwrap();
        let mut simulation = Simulation::deploy(&file, scenario.start_at).unwrap();

        assert!(simulation.run(&scenario).is_err());
        assert!(simulation.outcomes().is_empty());
        assert_eq!(simulation.deployment().now(), 1_700_000_020 - SECONDS_PER_DAY);
    }
}
