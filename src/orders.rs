//! Orders
//!
//! An order is the frozen result of checking out a cart: the lines as they were priced, the
//! coupon code that was used and the amounts that were charged.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    items::CartLine,
    pricing::{PricingError, ensure_currency, ensure_non_negative},
};

/// Errors raised while turning a cart into an order.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// Carts without lines cannot be checked out.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// The cart was checked out before.
    #[error("cart has already been paid")]
    AlreadyPaid,

    /// Wrapped pricing error.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapped cart error.
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// One ordered line and the amount charged for it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem<'a> {
    line: CartLine<'a>,
    total: Money<'a, Currency>,
}

impl<'a> OrderItem<'a> {
    /// Prices a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line total overflows.
    pub fn new(line: CartLine<'a>) -> Result<Self, PricingError> {
        let total = line.total()?;

        Ok(Self { line, total })
    }

    /// The line as ordered
    pub fn line(&self) -> &CartLine<'a> {
        &self.line
    }

    /// Amount charged for the line
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }
}

/// A checked-out cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Order<'a> {
    items: Vec<OrderItem<'a>>,
    coupon_code: Option<String>,
    subtotal: Money<'a, Currency>,
    discount: Money<'a, Currency>,
    grand_total: Money<'a, Currency>,
    payment_reference: Option<String>,
    currency: &'static Currency,
}

impl<'a> Order<'a> {
    /// Builds an order from stored parts, recomputing the totals from the lines.
    ///
    /// `discount` is the amount the coupon took off when the order was placed. The grand total
    /// is `max(0, subtotal - discount)`.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no lines, a line is in another currency or the discount is
    /// negative.
    pub fn new(
        currency: &'static Currency,
        lines: impl IntoIterator<Item = CartLine<'a>>,
        coupon_code: Option<String>,
        discount: Money<'a, Currency>,
        payment_reference: Option<String>,
    ) -> Result<Self, CheckoutError> {
        ensure_non_negative(&discount)?;
        ensure_currency(&discount, currency)?;

        let items = lines
            .into_iter()
            .map(|line| {
                ensure_currency(line.price(), currency)?;
                OrderItem::new(line)
            })
            .collect::<Result<Vec<_>, _>>()?;

        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let subtotal_minor = items.iter().try_fold(0_i64, |acc, item| {
            acc.checked_add(item.total.to_minor_units())
                .ok_or(PricingError::Overflow)
        })?;

        let grand_minor = subtotal_minor
            .saturating_sub(discount.to_minor_units())
            .max(0);

        Ok(Self {
            items,
            coupon_code,
            subtotal: Money::from_minor(subtotal_minor, currency),
            discount: Money::from_minor(subtotal_minor - grand_minor, currency),
            grand_total: Money::from_minor(grand_minor, currency),
            payment_reference,
            currency,
        })
    }

    /// Checks out a cart: prices every line, applies its coupon and marks the cart paid.
    ///
    /// The cart is left untouched on error.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for a cart without lines and
    /// [`CheckoutError::AlreadyPaid`] for a cart that was checked out before.
    pub fn checkout(
        cart: &mut Cart<'a>,
        payment_reference: Option<String>,
    ) -> Result<Self, CheckoutError> {
        if cart.is_paid() {
            return Err(CheckoutError::AlreadyPaid);
        }

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let discount = cart.discount()?;

        // An ineligible coupon does not count as used.
        let coupon_code = cart
            .coupon()
            .filter(|_coupon| discount.to_minor_units() > 0)
            .map(|coupon| coupon.code().to_string());

        let order = Self::new(
            cart.currency(),
            cart.lines().map(|(_key, line)| line.clone()),
            coupon_code,
            discount,
            payment_reference,
        )?;

        cart.mark_paid();

        Ok(order)
    }

    /// Ordered items
    pub fn items(&self) -> &[OrderItem<'a>] {
        &self.items
    }

    /// Coupon code used, if any
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    /// Sum of the item totals
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Amount taken off by the coupon
    pub fn discount(&self) -> Money<'a, Currency> {
        self.discount
    }

    /// Amount charged
    pub fn grand_total(&self) -> Money<'a, Currency> {
        self.grand_total
    }

    /// Payment provider reference
    pub fn payment_reference(&self) -> Option<&str> {
        self.payment_reference.as_deref()
    }

    /// Order currency
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
