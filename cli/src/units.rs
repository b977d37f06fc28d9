//! Conversions between base units and human-readable amounts

use anyhow::{bail, Context, Result};
use chrono::DateTime;
use nnbu_core::{Amount, Timestamp, TOKEN_DECIMALS, TOKEN_UNIT};

/// Parse "12", "0.5" or "1.000000000000000001" into base units
pub fn parse_units(input: &str) -> Result<Amount> {
    let input = input.trim();
    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (input, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        bail!("empty amount");
    }
    if fraction.len() > TOKEN_DECIMALS as usize {
        bail!("{} has more than {} decimals", input, TOKEN_DECIMALS);
    }

    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .with_context(|| format!("invalid amount: {}", input))?
    };
    let fraction: Amount = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = TOKEN_DECIMALS as usize);
        padded
            .parse()
            .with_context(|| format!("invalid amount: {}", input))?
    };

    whole
        .checked_mul(TOKEN_UNIT)
        .and_then(|w| w.checked_add(fraction))
        .with_context(|| format!("amount out of range: {}", input))
}

/// Whole tokens with the fractional part trimmed of trailing zeros
pub fn format_units(amount: Amount) -> String {
    let whole = amount / TOKEN_UNIT;
    let fraction = amount % TOKEN_UNIT;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0>width$}", fraction, width = TOKEN_DECIMALS as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

pub fn format_timestamp(timestamp: Timestamp) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
