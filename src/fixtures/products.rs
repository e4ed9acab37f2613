//! Catalog Fixtures

use std::str::FromStr;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::fixtures::FixtureError;

/// Colour or size variant from YAML
#[derive(Debug, Deserialize)]
pub struct VariantFixture {
    /// Display name
    pub name: String,

    /// Surcharge, e.g. "0.20 GBP"
    pub price: String,
}

/// Product from YAML
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Base price, e.g. "1.00 GBP"
    pub price: String,

    /// Category name
    #[serde(default)]
    pub category: Option<String>,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Colour variant keys
    #[serde(default)]
    pub colors: Vec<String>,

    /// Size variant keys
    #[serde(default)]
    pub sizes: Vec<String>,
}

/// Coupon from YAML
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Code the shopper types in
    pub code: String,

    /// Amount off, e.g. "0.50 GBP"
    pub discount: String,

    /// Minimum subtotal, e.g. "1.00 GBP"
    pub minimum: String,

    /// Whether the coupon starts out expired
    #[serde(default)]
    pub expired: bool,
}

/// Parse a price string like "2.50 GBP" into minor units and a currency.
///
/// # Errors
///
/// Returns an error if the format is wrong, the currency is unknown or the amount has more
/// decimal places than the currency allows.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    };

    let currency = rusty_money::iso::find(code)
        .ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    let amount =
        Decimal::from_str(amount).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor = amount
        .checked_mul(Decimal::from(10_i64.pow(currency.exponent)))
        .filter(|minor| minor.fract().is_zero())
        .and_then(|minor| minor.to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor, currency))
}

/// Parse a price and check it is in the fixture currency.
///
/// # Errors
///
/// Returns an error if the price cannot be parsed or is in another currency.
pub fn parse_money(
    s: &str,
    expected: &'static Currency,
) -> Result<Money<'static, Currency>, FixtureError> {
    let (minor, currency) = parse_price(s)?;

    if currency != expected {
        return Err(FixtureError::CurrencyMismatch(
            expected.iso_alpha_code.to_string(),
            currency.iso_alpha_code.to_string(),
        ));
    }

    Ok(Money::from_minor(minor, currency))
}
