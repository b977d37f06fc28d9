//! nnbu-sale - inspect and simulate a BABY token sale
//!
//! Reads a TOML deployment file and either prints the sale schedule,
//! quotes a purchase at a given moment, or replays a JSON scenario
//! against a simulated deployment.

mod config;
mod scenario;
mod units;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nnbu_core::{Amount, Timestamp, TokenLedger};
use nnbu_crowdsale::SalePhase;
use nnbu_economics::EffectiveRate;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

use crate::config::SaleFile;
use crate::scenario::{Scenario, Simulation};
use crate::units::{format_timestamp, format_units};

#[derive(Parser)]
#[command(name = "nnbu-sale")]
#[command(about = "BABY token sale inspector and simulator", version)]
struct Cli {
    /// Sale deployment file
    #[arg(short, long, value_name = "FILE", default_value = "sale.toml")]
    config: PathBuf,

    /// Log sale internals (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the sale windows, caps and rates
    Schedule,

    /// Quote how many tokens a payment buys at a given moment
    Quote {
        /// Unix timestamp of the purchase
        #[arg(long)]
        at: Timestamp,

        /// Payment in base units
        #[arg(long)]
        value: Amount,
    },

    /// Replay a JSON scenario against a fresh deployment
    Simulate {
        /// Scenario file
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let file = SaleFile::load(&cli.config)?;
    match cli.command {
        Commands::Schedule => show_schedule(&file),
        Commands::Quote { at, value } => show_quote(&file, at, value),
        Commands::Simulate { scenario } => run_simulation(&file, &scenario),
    }
}

fn show_schedule(file: &SaleFile) -> Result<()> {
    let config = file.crowdsale_config()?;
    let schedule = config.schedule();

    println!("\n{}", "BABY Token Sale".cyan().bold());
    println!("{}", "═══════════════════════════════════".cyan());
    println!("{}: {}", "Owner".yellow().bold(), file.owner());
    println!("{}: {}", "Wallet".yellow().bold(), config.wallet);
    println!("{}: {}", "Whitelist".yellow().bold(), config.whitelist);

    println!("\n{}", "Windows".yellow().bold());
    println!("  Opens:           {}", format_timestamp(schedule.start_time));
    if schedule.has_presale() {
        println!(
            "  Pre-sale until:  {} (+{}% bonus)",
            format_timestamp(schedule.presale_end()),
            config.presale_bonus_percent
        );
    } else {
        println!("  Pre-sale:        none");
    }
    println!("  Closes:          {}", format_timestamp(schedule.end_time));

    println!("\n{}", "Caps".yellow().bold());
    println!(
        "  Total supply:    {} BABY",
        format_units(config.caps.total_tokens_supply).green()
    );
    println!(
        "  Crowdsale:       {} BABY",
        format_units(config.caps.total_tokens_for_crowdsale).green()
    );
    println!(
        "  Pre-crowdsale:   {} BABY",
        format_units(config.caps.pre_crowdsale_cap).green()
    );
    println!(
        "  Team allocation: {} BABY",
        format_units(config.caps.team_allocation(config.caps.total_tokens_for_crowdsale)).green()
    );

    println!("\n{}", "Pricing".yellow().bold());
    println!("  Base rate:       {} BABY per unit", config.rate);
    println!(
        "  Minimum:         {} per purchase",
        format_units(config.min_contribution)
    );
    println!();
    Ok(())
}

fn show_quote(file: &SaleFile, at: Timestamp, value: Amount) -> Result<()> {
    let config = file.crowdsale_config()?;
    let schedule = config.schedule();
    let phase = schedule.phase_at(at);

    println!("\n{}", "Purchase Quote".cyan().bold());
    println!("{}", "═══════════════════════════════════".cyan());
    println!("{}: {}", "At".yellow().bold(), format_timestamp(at));
    println!("{}: {:?}", "Phase".yellow().bold(), phase);
    println!("{}: {}", "Payment".yellow().bold(), format_units(value));

    let rate = EffectiveRate::at(&schedule, config.rate, config.presale_bonus_percent, at)?;
    match rate {
        Some(rate) => {
            let tokens = rate.tokens_for(value)?;
            println!(
                "{}: {} (+{}%)",
                "Rate".yellow().bold(),
                rate.base,
                rate.bonus_percent
            );
            println!(
                "{}: {} BABY",
                "Tokens".yellow().bold(),
                format_units(tokens).green().bold()
            );
            if value < config.min_contribution {
                println!(
                    "{} below the {} minimum contribution",
                    "⚠".yellow(),
                    format_units(config.min_contribution)
                );
            }
            if phase == SalePhase::PreSale && tokens > config.caps.pre_crowdsale_cap {
                println!("{} exceeds the pre-crowdsale cap", "⚠".yellow());
            } else if tokens > config.caps.total_tokens_for_crowdsale {
                println!("{} exceeds the crowdsale cap", "⚠".yellow());
            }
        }
        None => println!("{}", "Sale is not accepting purchases".red()),
    }
    println!();
    Ok(())
}

fn run_simulation(file: &SaleFile, path: &Path) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let mut simulation = Simulation::deploy(file, scenario.start_at)?;
    simulation.run(&scenario).context("scenario aborted")?;

    println!("\n{}", "Simulation".cyan().bold());
    println!("{}", "═══════════════════════════════════".cyan());
    for outcome in simulation.outcomes() {
        let status = match &outcome.result {
            Ok(message) => format!("{} {}", "✓".green(), message),
            Err(error) => format!("{} {}", "✗".red(), error.red()),
        };
        println!(
            "{:>3}. [{}] {}: {}",
            outcome.index,
            format_timestamp(outcome.now).bright_black(),
            outcome.description.bright_white(),
            status
        );
    }

    let deployment = simulation.deployment();
    let token = deployment.token();
    println!("\n{}", "Final State".yellow().bold());
    println!("  Phase:           {:?}", deployment.crowdsale().phase(deployment.now()));
    println!("  Total supply:    {} BABY", format_units(token.total_supply()));
    println!("  Funds raised:    {}", format_units(deployment.crowdsale().funds_raised()));
    println!("  Token paused:    {}", token.paused());
    println!("  Minting closed:  {}", token.minting_finished());
    if let Some(purchaser) = deployment.crowdsale().remainder_purchaser() {
        println!(
            "  Remainder:       {} owed to {}",
            format_units(deployment.crowdsale().remainder_amount()),
            purchaser
        );
    }

    println!("\n{}", "Events".yellow().bold());
    for event in deployment.crowdsale().events() {
        println!("  {}", serde_json::to_string(event)?.bright_black());
    }
    println!();
    Ok(())
}
