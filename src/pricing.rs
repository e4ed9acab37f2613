//! Pricing

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::items::CartLine;

/// Errors that can occur while pricing lines and carts.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// No lines were provided, so currency could not be determined.
    #[error("no lines provided; cannot determine currency")]
    NoItems,

    /// A line was created or updated with a quantity of zero.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// A price, surcharge or discount was below zero.
    #[error("amount must not be negative: {0}")]
    NegativeAmount(String),

    /// Two amounts in the same calculation use different currencies.
    #[error("currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Minor unit arithmetic overflowed.
    #[error("amount overflowed")]
    Overflow,

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Rejects negative amounts.
///
/// # Errors
///
/// Returns [`PricingError::NegativeAmount`] when `amount` is below zero.
pub fn ensure_non_negative(amount: &Money<'_, Currency>) -> Result<(), PricingError> {
    if amount.to_minor_units() < 0 {
        return Err(PricingError::NegativeAmount(amount.to_string()));
    }

    Ok(())
}

/// Rejects amounts whose currency differs from `expected`.
///
/// # Errors
///
/// Returns [`PricingError::CurrencyMismatch`] when the currencies differ.
pub fn ensure_currency(
    amount: &Money<'_, Currency>,
    expected: &Currency,
) -> Result<(), PricingError> {
    let found = amount.currency();

    if found == expected {
        Ok(())
    } else {
        Err(PricingError::CurrencyMismatch(
            expected.iso_alpha_code,
            found.iso_alpha_code,
        ))
    }
}

/// Calculates the total price of a list of cart lines
///
/// # Errors
///
/// - [`PricingError::NoItems`]: No lines were provided, so currency could not be determined.
/// - Any error from pricing an individual line, or a currency mismatch between lines.
pub fn total_price<'a>(lines: &[CartLine<'a>]) -> Result<Money<'a, Currency>, PricingError> {
    let first = lines.first().ok_or(PricingError::NoItems)?;
    let currency = first.currency();

    let total = lines.iter().try_fold(0_i64, |acc, line| {
        let line_total = line.total()?;

        ensure_currency(&line_total, currency)?;

        acc.checked_add(line_total.to_minor_units())
            .ok_or(PricingError::Overflow)
    })?;

    Ok(Money::from_minor(total, currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::catalog::Variant;

    use super::*;

    #[test]
    fn total_price_sums_line_totals() -> TestResult {
        let lines = [
            CartLine::new("Shirt", Money::from_minor(100, iso::GBP), 2)?,
            CartLine::new("Socks", Money::from_minor(50, iso::GBP), 1)?
                .with_size(Variant::new("L", Money::from_minor(5, iso::GBP))?)?,
        ];

        assert_eq!(total_price(&lines)?, Money::from_minor(255, iso::GBP));

        Ok(())
    }

    #[test]
    fn total_price_empty() {
        let lines: [CartLine<'static>; 0] = [];

        assert!(matches!(total_price(&lines), Err(PricingError::NoItems)));
    }

    #[test]
    fn total_price_rejects_mixed_currencies() -> TestResult {
        let lines = [
            CartLine::new("Shirt", Money::from_minor(100, iso::GBP), 1)?,
            CartLine::new("Hat", Money::from_minor(100, iso::USD), 1)?,
        ];

        assert_eq!(
            total_price(&lines),
            Err(PricingError::CurrencyMismatch("GBP", "USD"))
        );

        Ok(())
    }

    #[test]
    fn ensure_non_negative_rejects_negative_amounts() {
        let result = ensure_non_negative(&Money::from_minor(-1, iso::GBP));

        assert!(matches!(result, Err(PricingError::NegativeAmount(_))));
    }
}
