//! Coupons
//!
//! A coupon takes a fixed amount off a cart whose subtotal has reached the coupon's minimum.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::pricing::{PricingError, ensure_currency, ensure_non_negative};

/// Reasons a coupon cannot be used. The messages are shown to the shopper as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CouponRejection {
    /// No coupon exists with the given code.
    #[error("Invalid coupon code.")]
    Unknown,

    /// The cart already carries a coupon.
    #[error("A coupon has already been applied to this cart.")]
    AlreadyApplied,

    /// The coupon has been expired by an administrator.
    #[error("Coupon code expired.")]
    Expired,

    /// The cart subtotal is below the coupon minimum.
    #[error("Your cart total must be at least {minimum} to use this coupon.")]
    BelowMinimum {
        /// Formatted minimum amount
        minimum: String,
    },

    /// The coupon is priced in another currency.
    #[error("This coupon cannot be used with {0} prices.")]
    CurrencyMismatch(&'static str),
}

/// Coupon
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon<'a> {
    code: String,
    discount: Money<'a, Currency>,
    minimum: Money<'a, Currency>,
    expired: bool,
}

impl<'a> Coupon<'a> {
    /// Creates an active coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if either amount is negative or the two amounts use different currencies.
    pub fn new(
        code: impl Into<String>,
        discount: Money<'a, Currency>,
        minimum: Money<'a, Currency>,
    ) -> Result<Self, PricingError> {
        ensure_non_negative(&discount)?;
        ensure_non_negative(&minimum)?;
        ensure_currency(&minimum, discount.currency())?;

        Ok(Self {
            code: code.into(),
            discount,
            minimum,
            expired: false,
        })
    }

    /// Marks the coupon as expired (or not).
    #[must_use]
    pub fn with_expired(mut self, expired: bool) -> Self {
        self.expired = expired;
        self
    }

    /// Coupon code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Amount taken off an eligible subtotal
    pub fn discount(&self) -> &Money<'a, Currency> {
        &self.discount
    }

    /// Smallest subtotal the coupon applies to
    pub fn minimum(&self) -> &Money<'a, Currency> {
        &self.minimum
    }

    /// Whether the coupon has been expired
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Checks whether the coupon may be used against `subtotal`.
    ///
    /// # Errors
    ///
    /// Returns the [`CouponRejection`] to show the shopper.
    pub fn check(&self, subtotal: &Money<'_, Currency>) -> Result<(), CouponRejection> {
        if self.expired {
            return Err(CouponRejection::Expired);
        }

        if ensure_currency(subtotal, self.discount.currency()).is_err() {
            return Err(CouponRejection::CurrencyMismatch(
                subtotal.currency().iso_alpha_code,
            ));
        }

        if subtotal.to_minor_units() < self.minimum.to_minor_units() {
            return Err(CouponRejection::BelowMinimum {
                minimum: self.minimum.to_string(),
            });
        }

        Ok(())
    }

    /// Whether [`Coupon::check`] passes.
    pub fn is_eligible(&self, subtotal: &Money<'_, Currency>) -> bool {
        self.check(subtotal).is_ok()
    }

    /// Discounted total: `max(0, subtotal - discount)`.
    ///
    /// # Errors
    ///
    /// Returns the [`CouponRejection`] when the coupon is not eligible.
    pub fn apply<'s>(
        &self,
        subtotal: Money<'s, Currency>,
    ) -> Result<Money<'s, Currency>, CouponRejection> {
        self.check(&subtotal)?;

        let discounted = subtotal
            .to_minor_units()
            .saturating_sub(self.discount.to_minor_units())
            .max(0);

        Ok(Money::from_minor(discounted, subtotal.currency()))
    }
}

/// Total after an optional coupon. An ineligible coupon leaves the subtotal unchanged.
pub fn apply_discount<'a>(
    subtotal: Money<'a, Currency>,
    coupon: Option<&Coupon<'_>>,
) -> Money<'a, Currency> {
    coupon
        .and_then(|coupon| coupon.apply(subtotal).ok())
        .unwrap_or(subtotal)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    fn coupon(discount: i64, minimum: i64) -> Result<Coupon<'static>, PricingError> {
        Coupon::new(
            "DISCOUNT10",
            Money::from_minor(discount, iso::GBP),
            Money::from_minor(minimum, iso::GBP),
        )
    }

    #[test]
    fn apply_subtracts_discount_when_minimum_met() -> TestResult {
        let coupon = coupon(50, 100)?;

        assert_eq!(
            coupon.apply(Money::from_minor(100, iso::GBP))?,
            Money::from_minor(50, iso::GBP)
        );

        Ok(())
    }

    #[test]
    fn apply_never_goes_below_zero() -> TestResult {
        let coupon = coupon(500, 100)?;

        assert_eq!(
            coupon.apply(Money::from_minor(120, iso::GBP))?,
            Money::from_minor(0, iso::GBP)
        );

        Ok(())
    }

    #[test]
    fn below_minimum_is_rejected_with_message() -> TestResult {
        let coupon = coupon(10, 500)?;

        let result = coupon.apply(Money::from_minor(499, iso::GBP));

        let Err(rejection) = result else {
            panic!("expected a rejection, got {result:?}");
        };

        assert!(matches!(rejection, CouponRejection::BelowMinimum { .. }));
        assert!(
            rejection.to_string().contains("at least"),
            "message should explain the minimum: {rejection}"
        );

        Ok(())
    }

    #[test]
    fn expired_coupon_is_rejected() -> TestResult {
        let coupon = coupon(10, 0)?.with_expired(true);

        assert_eq!(
            coupon.apply(Money::from_minor(1_000, iso::GBP)),
            Err(CouponRejection::Expired)
        );

        Ok(())
    }

    #[test]
    fn apply_discount_leaves_subtotal_when_ineligible() -> TestResult {
        let coupon = coupon(10, 500)?;

        for minor in [0, 1, 250, 499] {
            let subtotal = Money::from_minor(minor, iso::GBP);

            assert_eq!(apply_discount(subtotal, Some(&coupon)), subtotal);
        }

        Ok(())
    }

    #[test]
    fn apply_discount_without_coupon_is_identity() {
        let subtotal = Money::from_minor(1_234, iso::GBP);

        assert_eq!(apply_discount(subtotal, None), subtotal);
    }

    #[test]
    fn other_currency_subtotal_is_rejected() -> TestResult {
        let coupon = coupon(10, 0)?;

        assert_eq!(
            coupon.apply(Money::from_minor(100, iso::USD)),
            Err(CouponRejection::CurrencyMismatch("USD"))
        );

        Ok(())
    }

    #[test]
    fn negative_discount_is_rejected() {
        assert!(matches!(coupon(-1, 0), Err(PricingError::NegativeAmount(_))));
    }
}
