//! Order Records

use jiff::Timestamp;
use rusty_money::iso::{self, Currency};
use storefront::{catalog::Variant, items::CartLine, orders::Order, pricing::PricingError};

use crate::{
    domain::{
        carts::records::CartUuid, catalog::records::ProductUuid, orders::OrdersServiceError,
        users::records::UserUuid,
    },
    money::to_money,
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
///
/// A snapshot of a checked-out cart: later catalog or coupon changes do not alter it.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub cart_uuid: CartUuid,
    pub coupon_code: Option<String>,
    pub currency: String,
    pub subtotal: u64,
    pub discount: u64,
    pub grand_total: u64,
    pub payment_reference: Option<String>,
    pub items: Vec<OrderItemRecord>,
    pub created_at: Timestamp,
}

impl OrderRecord {
    /// Rebuilds the priced order from the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored currency is unknown or an amount cannot be represented.
    pub fn to_order(&self) -> Result<Order<'static>, OrdersServiceError> {
        let currency = iso::find(&self.currency)
            .ok_or_else(|| OrdersServiceError::UnknownCurrency(self.currency.clone()))?;

        let lines = self
            .items
            .iter()
            .map(|item| item.to_line(currency))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Order::new(
            currency,
            lines,
            self.coupon_code.clone(),
            to_money(self.discount, currency)?,
            self.payment_reference.clone(),
        )?)
    }
}

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// Order Item Record
#[derive(Debug, Clone)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,

    /// Cleared if the product row is ever removed; the snapshot fields stay.
    pub product_uuid: Option<ProductUuid>,

    pub position: u32,
    pub product_name: String,
    pub price: u64,
    pub color_name: Option<String>,
    pub color_price: u64,
    pub size_name: Option<String>,
    pub size_price: u64,
    pub quantity: u32,
    pub total: u64,
}

impl OrderItemRecord {
    /// Priced line for this item.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored amount cannot be represented in `currency`.
    pub fn to_line(&self, currency: &'static Currency) -> Result<CartLine<'static>, PricingError> {
        let mut line = CartLine::new(
            self.product_name.clone(),
            to_money(self.price, currency)?,
            self.quantity,
        )?;

        if let Some(name) = &self.color_name {
            line = line.with_color(Variant::new(
                name.clone(),
                to_money(self.color_price, currency)?,
            )?)?;
        }

        if let Some(name) = &self.size_name {
            line = line.with_size(Variant::new(
                name.clone(),
                to_money(self.size_price, currency)?,
            )?)?;
        }

        Ok(line)
    }
}
