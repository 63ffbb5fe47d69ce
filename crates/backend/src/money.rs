//! Integer-cents arithmetic for monetary values.
//!
//! Amounts never pass through floating point: fees are computed in basis
//! points with integer math, and parsing/formatting works on dollar and cent
//! digits directly.

use thiserror::Error;

/// Errors from parsing a currency string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// The string is not a recognisable `$x.yz` amount.
    #[error("invalid currency amount: {0}")]
    InvalidAmount(String),
}

/// Fee for `amount_cents` at `bps` basis points (1 bps = 0.01%).
///
/// Truncates toward zero, matching how the processors round.
pub fn fee_cents(amount_cents: u64, bps: u32) -> u64 {
    ((amount_cents as u128 * bps as u128) / 10_000) as u64
}

/// Render an integer-cents amount as `$d.cc`.
pub fn format_cents(amount_cents: u64) -> String {
    format!("${}.{:02}", amount_cents / 100, amount_cents % 100)
}

/// Parse a `$x.yz` string (optional `$`, `,` thousands separators) into cents.
///
/// # Errors
///
/// Returns [`MoneyError::InvalidAmount`] if the string has more than two
/// decimal digits or contains anything besides digits, `$`, `,` and `.`.
pub fn parse_cents(input: &str) -> Result<u64, MoneyError> {
    let cleaned = input.trim().replace(['$', ','], "");
    if cleaned.is_empty() {
        return Err(MoneyError::InvalidAmount(input.to_owned()));
    }

    let (dollars, cents) = match cleaned.split_once('.') {
        Some((d, c)) => (d, c),
        None => (cleaned.as_str(), ""),
    };

    if cents.len() > 2 || !cents.chars().all(|c| c.is_ascii_digit()) {
        return Err(MoneyError::InvalidAmount(input.to_owned()));
    }

    let dollars: u64 = if dollars.is_empty() {
        0
    } else {
        dollars
            .parse()
            .map_err(|_| MoneyError::InvalidAmount(input.to_owned()))?
    };

    // "5" → 50 cents, "05" → 5 cents.
    let cents: u64 = match cents.len() {
        0 => 0,
        1 => cents.parse::<u64>().unwrap_or(0) * 10,
        _ => cents.parse().unwrap_or(0),
    };

    Ok(dollars * 100 + cents)
}
