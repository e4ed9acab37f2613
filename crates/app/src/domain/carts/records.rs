//! Cart Records

use jiff::Timestamp;
use rusty_money::iso::Currency;
use storefront::{
    cart::{Cart, CartError},
    catalog::Variant,
    items::CartLine,
    pricing::PricingError,
};

use crate::{
    domain::{
        catalog::records::{ColorVariantUuid, ProductUuid, SizeVariantUuid},
        coupons::records::CouponRecord,
        users::records::UserUuid,
    },
    money::to_money,
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Record
///
/// `subtotal`, `discount`, `total` and each item's `line_total` are computed from the current
/// catalog prices whenever the cart is read.
#[derive(Debug, Clone)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub coupon: Option<CouponRecord>,
    pub is_paid: bool,
    pub paid_at: Option<Timestamp>,
    pub items: Vec<CartItemRecord>,
    pub subtotal: u64,
    pub discount: u64,
    pub total: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartRecord {
    /// Number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Applied coupon code, if any.
    #[must_use]
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon.as_ref().map(|coupon| coupon.code.as_str())
    }

    /// Builds the priced cart, restoring any stored coupon without re-checking it.
    ///
    /// Stored items are distinct rows, so each one becomes its own line.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored amount cannot be represented in `currency`.
    pub fn to_cart(&self, currency: &'static Currency) -> Result<Cart<'static>, CartError> {
        let mut cart = Cart::new(currency);

        for item in &self.items {
            cart.add_line(item.to_line(currency)?)?;
        }

        if let Some(coupon) = &self.coupon {
            cart = cart.with_coupon(coupon.to_coupon(currency)?);
        }

        if self.is_paid {
            cart.mark_paid();
        }

        Ok(cart)
    }
}

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// The colour or size chosen for a cart item, at its current price.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItemVariant<T> {
    pub uuid: T,
    pub name: String,
    pub price: u64,
}

/// Cart Item Record
#[derive(Debug, Clone)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub cart_uuid: CartUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub price: u64,
    pub color: Option<CartItemVariant<ColorVariantUuid>>,
    pub size: Option<CartItemVariant<SizeVariantUuid>>,
    pub quantity: u32,
    pub line_total: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartItemRecord {
    /// Identifies the product and variant choice. Two items share a SKU only when they point at
    /// the same product, colour and size rows.
    #[must_use]
    pub fn sku(&self) -> String {
        let color = self.color.as_ref().map(|color| color.uuid.to_string());
        let size = self.size.as_ref().map(|size| size.uuid.to_string());

        format!(
            "{}/{}/{}",
            self.product_uuid,
            color.as_deref().unwrap_or("-"),
            size.as_deref().unwrap_or("-")
        )
    }

    /// Priced line for this item, keyed by [`CartItemRecord::sku`].
    ///
    /// # Errors
    ///
    /// Returns an error if a stored amount cannot be represented in `currency`.
    pub fn to_line(&self, currency: &'static Currency) -> Result<CartLine<'static>, PricingError> {
        let mut line = CartLine::new(
            self.product_name.clone(),
            to_money(self.price, currency)?,
            self.quantity,
        )?
        .with_sku(self.sku());

        if let Some(color) = &self.color {
            line = line.with_color(Variant::new(
                color.name.clone(),
                to_money(color.price, currency)?,
            )?)?;
        }

        if let Some(size) = &self.size {
            line = line.with_size(Variant::new(
                size.name.clone(),
                to_money(size.price, currency)?,
            )?)?;
        }

        Ok(line)
    }
}
