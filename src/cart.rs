//! Cart

use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::{
    coupons::{Coupon, CouponRejection, apply_discount},
    items::CartLine,
    pricing::{PricingError, total_price},
};

new_key_type! {
    /// Cart line key
    pub struct LineKey;
}

/// Errors related to cart changes and totals.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A line's currency differs from the cart currency (line currency, cart currency).
    #[error("line has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The cart has been paid and can no longer change.
    #[error("cart has already been paid")]
    AlreadyPaid,

    /// No line exists for the key.
    #[error("cart line not found")]
    LineNotFound(LineKey),

    /// Wrapped pricing error.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The coupon could not be applied.
    #[error(transparent)]
    Coupon(#[from] CouponRejection),
}

/// A shopper's cart: priced lines plus at most one coupon.
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: SlotMap<LineKey, CartLine<'a>>,
    coupon: Option<Coupon<'a>>,
    currency: &'static Currency,
    paid: bool,
}

impl<'a> Cart<'a> {
    /// Create an empty, unpaid cart.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: SlotMap::with_key(),
            coupon: None,
            currency,
            paid: false,
        }
    }

    /// Adds a line. When the cart already holds a line with the same SKU, base price and
    /// variants, that line's quantity grows instead and its key is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is paid or the line is in another currency.
    pub fn add_line(&mut self, line: CartLine<'a>) -> Result<LineKey, CartError> {
        self.ensure_unpaid()?;

        let line_currency = line.currency();

        if line_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                line_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let existing = self
            .lines
            .iter_mut()
            .find(|(_key, current)| same_line(current, &line));

        if let Some((key, current)) = existing {
            let quantity = current
                .quantity()
                .checked_add(line.quantity())
                .ok_or(PricingError::Overflow)?;

            current.set_quantity(quantity)?;

            return Ok(key);
        }

        Ok(self.lines.insert(line))
    }

    /// Removes a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is paid or the line does not exist.
    pub fn remove_line(&mut self, key: LineKey) -> Result<CartLine<'a>, CartError> {
        self.ensure_unpaid()?;

        self.lines.remove(key).ok_or(CartError::LineNotFound(key))
    }

    /// Sets a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is paid, the line does not exist or the quantity is zero.
    pub fn set_quantity(&mut self, key: LineKey, quantity: u32) -> Result<(), CartError> {
        self.ensure_unpaid()?;

        let line = self
            .lines
            .get_mut(key)
            .ok_or(CartError::LineNotFound(key))?;

        line.set_quantity(quantity)?;

        Ok(())
    }

    /// Look up a line.
    pub fn line(&self, key: LineKey) -> Option<&CartLine<'a>> {
        self.lines.get(key)
    }

    /// Iterate over the lines in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = (LineKey, &CartLine<'a>)> {
        self.lines.iter()
    }

    /// Number of distinct lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Cart currency
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Sum of every line total; zero for an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if a line total overflows.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        if self.is_empty() {
            return Ok(Money::from_minor(0, self.currency));
        }

        let lines: Vec<CartLine<'a>> = self.lines.values().cloned().collect();

        Ok(total_price(&lines)?)
    }

    /// Attaches a coupon after checking it against the current subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`CouponRejection::AlreadyApplied`] when a coupon is already attached, or the
    /// coupon's own rejection when it is not eligible. The cart is unchanged on error.
    pub fn apply_coupon(&mut self, coupon: Coupon<'a>) -> Result<(), CartError> {
        self.ensure_unpaid()?;

        if self.coupon.is_some() {
            return Err(CouponRejection::AlreadyApplied.into());
        }

        coupon.check(&self.subtotal()?)?;

        self.coupon = Some(coupon);

        Ok(())
    }

    /// Restores a previously applied coupon without re-checking it. [`Cart::total`] ignores the
    /// coupon for as long as it is ineligible.
    #[must_use]
    pub fn with_coupon(mut self, coupon: Coupon<'a>) -> Self {
        self.coupon = Some(coupon);
        self
    }

    /// Detaches the coupon, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is paid.
    pub fn remove_coupon(&mut self) -> Result<Option<Coupon<'a>>, CartError> {
        self.ensure_unpaid()?;

        Ok(self.coupon.take())
    }

    /// Attached coupon
    pub fn coupon(&self) -> Option<&Coupon<'a>> {
        self.coupon.as_ref()
    }

    /// Amount to pay. A coupon that is no longer eligible (say after lines were removed) is
    /// ignored rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the subtotal cannot be calculated.
    pub fn total(&self) -> Result<Money<'a, Currency>, CartError> {
        Ok(apply_discount(self.subtotal()?, self.coupon.as_ref()))
    }

    /// Amount the coupon takes off the subtotal.
    ///
    /// # Errors
    ///
    /// Returns an error if the subtotal cannot be calculated.
    pub fn discount(&self) -> Result<Money<'a, Currency>, CartError> {
        let subtotal = self.subtotal()?;
        let total = apply_discount(subtotal, self.coupon.as_ref());

        Ok(subtotal.sub(total).map_err(PricingError::from)?)
    }

    /// Whether the cart has been checked out
    pub fn is_paid(&self) -> bool {
        self.paid
    }

    /// Freezes the cart. Further changes return [`CartError::AlreadyPaid`].
    pub fn mark_paid(&mut self) {
        self.paid = true;
    }

    fn ensure_unpaid(&self) -> Result<(), CartError> {
        if self.paid {
            Err(CartError::AlreadyPaid)
        } else {
            Ok(())
        }
    }
}

fn same_line(a: &CartLine<'_>, b: &CartLine<'_>) -> bool {
    a.sku() == b.sku() && a.price() == b.price() && a.color() == b.color() && a.size() == b.size()
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::catalog::Variant;

    use super::*;

    fn shirt(quantity: u32) -> Result<CartLine<'static>, PricingError> {
        CartLine::new("Shirt", Money::from_minor(100, iso::GBP), quantity)
    }

    fn coupon(discount: i64, minimum: i64) -> Result<Coupon<'static>, PricingError> {
        Coupon::new(
            "SAVE",
            Money::from_minor(discount, iso::GBP),
            Money::from_minor(minimum, iso::GBP),
        )
    }

    #[test]
    fn empty_cart_subtotal_is_zero() -> TestResult {
        let cart = Cart::new(iso::GBP);

        assert_eq!(cart.subtotal()?, Money::from_minor(0, iso::GBP));
        assert_eq!(cart.total()?, Money::from_minor(0, iso::GBP));

        Ok(())
    }

    #[test]
    fn add_same_line_increments_quantity() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        let first = cart.add_line(shirt(1)?)?;
        let second = cart.add_line(shirt(2)?)?;

        assert_eq!(first, second);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line(first).map(CartLine::quantity), Some(3));

        Ok(())
    }

    #[test]
    fn different_size_is_a_separate_line() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_line(shirt(1)?)?;
        cart.add_line(shirt(1)?.with_size(Variant::new("L", Money::from_minor(5, iso::GBP))?)?)?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.subtotal()?, Money::from_minor(205, iso::GBP));

        Ok(())
    }

    #[test]
    fn same_name_at_another_price_is_a_separate_line() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_line(shirt(1)?)?;
        cart.add_line(CartLine::new("Shirt", Money::from_minor(200, iso::GBP), 1)?)?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.subtotal()?, Money::from_minor(300, iso::GBP));

        Ok(())
    }

    #[test]
    fn lines_with_other_skus_do_not_merge() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_line(shirt(1)?.with_sku("shirt-2024"))?;
        let key = cart.add_line(shirt(1)?.with_sku("shirt-2025"))?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.line(key).map(CartLine::sku), Some("shirt-2025"));

        let merged = cart.add_line(shirt(2)?.with_sku("shirt-2025"))?;

        assert_eq!(merged, key);
        assert_eq!(cart.line(key).map(CartLine::quantity), Some(3));
        assert_eq!(cart.subtotal()?, Money::from_minor(400, iso::GBP));

        Ok(())
    }

    #[test]
    fn add_line_rejects_other_currency() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        let result = cart.add_line(CartLine::new("Hat", Money::from_minor(100, iso::USD), 1)?);

        assert_eq!(result, Err(CartError::CurrencyMismatch("USD", "GBP")));

        Ok(())
    }

    #[test]
    fn coupon_reduces_total() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_line(shirt(2)?)?;
        cart.apply_coupon(coupon(50, 100)?)?;

        assert_eq!(cart.subtotal()?, Money::from_minor(200, iso::GBP));
        assert_eq!(cart.total()?, Money::from_minor(150, iso::GBP));
        assert_eq!(cart.discount()?, Money::from_minor(50, iso::GBP));

        Ok(())
    }

    #[test]
    fn second_coupon_is_rejected() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_line(shirt(2)?)?;
        cart.apply_coupon(coupon(50, 100)?)?;

        let result = cart.apply_coupon(coupon(10, 0)?);

        assert_eq!(result, Err(CartError::Coupon(CouponRejection::AlreadyApplied)));
        assert_eq!(cart.coupon().map(Coupon::discount), Some(&Money::from_minor(50, iso::GBP)));

        Ok(())
    }

    #[test]
    fn ineligible_coupon_leaves_cart_unchanged() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_line(shirt(1)?)?;

        let result = cart.apply_coupon(coupon(10, 500)?);

        assert!(matches!(result, Err(CartError::Coupon(CouponRejection::BelowMinimum { .. }))));
        assert!(cart.coupon().is_none());
        assert_eq!(cart.total()?, Money::from_minor(100, iso::GBP));

        Ok(())
    }

    #[test]
    fn coupon_stops_counting_when_subtotal_drops_below_minimum() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        let key = cart.add_line(shirt(2)?)?;
        cart.apply_coupon(coupon(50, 200)?)?;
        cart.set_quantity(key, 1)?;

        assert_eq!(cart.total()?, Money::from_minor(100, iso::GBP));
        assert_eq!(cart.discount()?, Money::from_minor(0, iso::GBP));

        Ok(())
    }

    #[test]
    fn restored_expired_coupon_does_not_discount() -> TestResult {
        let mut cart = Cart::new(iso::GBP).with_coupon(coupon(50, 0)?.with_expired(true));

        cart.add_line(shirt(1)?)?;

        assert!(cart.coupon().is_some());
        assert_eq!(cart.total()?, Money::from_minor(100, iso::GBP));

        Ok(())
    }

    #[test]
    fn paid_cart_is_frozen() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        let key = cart.add_line(shirt(1)?)?;
        cart.mark_paid();

        assert_eq!(cart.add_line(shirt(1)?), Err(CartError::AlreadyPaid));
        assert_eq!(cart.set_quantity(key, 4), Err(CartError::AlreadyPaid));
        assert!(matches!(cart.remove_line(key), Err(CartError::AlreadyPaid)));

        Ok(())
    }

    #[test]
    fn remove_missing_line_errors() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        let key = cart.add_line(shirt(1)?)?;
        cart.remove_line(key)?;

        assert!(matches!(
            cart.remove_line(key),
            Err(CartError::LineNotFound(_))
        ));
        assert!(cart.is_empty());

        Ok(())
    }
}
