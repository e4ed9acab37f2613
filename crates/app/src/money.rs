//! Conversions between stored amounts and `Money`.
//!
//! Amounts are stored as `BIGINT` minor units and exposed as `u64`. Quantities and positions are
//! stored as `INTEGER` and exposed as `u32`.

use rusty_money::{Money, iso::Currency};
use sqlx::{Row, postgres::PgRow};
use storefront::pricing::PricingError;

pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn try_get_optional_amount(row: &PgRow, col: &str) -> Result<Option<u64>, sqlx::Error> {
    let amount_i64: Option<i64> = row.try_get(col)?;

    amount_i64
        .map(u64::try_from)
        .transpose()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: col.to_string(),
            source: Box::new(e),
        })
}

pub(crate) fn amount_param(amount: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn try_get_count(row: &PgRow, col: &str) -> Result<u32, sqlx::Error> {
    let count: i32 = row.try_get(col)?;

    u32::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn count_param(count: u32, col: &str) -> Result<i32, sqlx::Error> {
    i32::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

pub(crate) fn to_money(
    amount: u64,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let minor = i64::try_from(amount).map_err(|_err| PricingError::Overflow)?;

    Ok(Money::from_minor(minor, currency))
}

pub(crate) fn to_amount(money: &Money<'_, Currency>) -> Result<u64, PricingError> {
    u64::try_from(money.to_minor_units())
        .map_err(|_err| PricingError::NegativeAmount(money.to_string()))
}
