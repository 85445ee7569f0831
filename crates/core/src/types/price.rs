//! Price parsing and display using decimal arithmetic.
//!
//! Prices are plain [`Decimal`] amounts in a single store currency. Amounts are
//! never `f64` so that `2 × 10.10` is exactly `20.20`.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Number of decimal places a price may carry.
const PRICE_SCALE: u32 = 2;

/// Errors from parsing a user-supplied price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price is required")]
    Empty,
    #[error("invalid price: {0}")]
    Invalid(String),
    #[error("price must not be negative")]
    Negative,
}

/// Format an amount for display (e.g., `$1299.00`).
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(PRICE_SCALE))
}

/// Parse a price typed into a form.
///
/// Accepts an optional leading `$` and surrounding whitespace. The result is
/// rounded to cents, halves away from zero.
///
/// # Errors
///
/// Returns `PriceError` if the input is empty, not a number, or negative.
pub fn parse_price(raw: &str) -> Result<Decimal, PriceError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
    if digits.is_empty() {
        return Err(PriceError::Empty);
    }

    let amount =
        Decimal::from_str(digits).map_err(|_| PriceError::Invalid(trimmed.to_owned()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PriceError::Negative);
    }

    Ok(amount.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_pads_cents() {
        assert_eq!(format_price(Decimal::new(999, 0)), "$999.00");
        assert_eq!(format_price(Decimal::new(34999, 2)), "$349.99");
    }

    #[test]
    fn test_parse_price_accepts_dollar_prefix() {
        assert_eq!(parse_price(" $19.99 ").unwrap(), Decimal::new(1999, 2));
        assert_eq!(parse_price("5").unwrap(), Decimal::new(5, 0));
    }

    #[test]
    fn test_parse_price_rounds_half_cents_up() {
        assert_eq!(parse_price("10.005").unwrap().to_string(), "10.01");
        assert_eq!(parse_price("0.125").unwrap().to_string(), "0.13");
    }

    #[test]
    fn test_parse_price_rejects_bad_input() {
        assert_eq!(parse_price("   "), Err(PriceError::Empty));
        assert!(matches!(parse_price("ten"), Err(PriceError::Invalid(_))));
        assert_eq!(parse_price("-1.50"), Err(PriceError::Negative));
    }
}
