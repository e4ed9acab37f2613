//! Items
//!
//! A cart line is one product, optionally in a colour and a size, bought some number of times.
//!
//! Both variant surcharges are charged per unit: the line total is the unit price (base price plus
//! colour and size surcharges) times the quantity.
//!
//! A line's SKU names the product and variant choice it was made from. Callers with their own
//! identifiers set it with [`CartLine::with_sku`]; lines only merge when their SKUs match.

use rusty_money::{Money, iso::Currency};

use crate::{
    catalog::{Product, Variant},
    pricing::{PricingError, ensure_currency, ensure_non_negative},
};

/// A priced line in a cart or order.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    sku: String,
    product_name: String,
    price: Money<'a, Currency>,
    color: Option<Variant<'a>>,
    size: Option<Variant<'a>>,
    quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Creates a line for a product at its base price. The SKU defaults to the product name.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is negative or the quantity is zero.
    pub fn new(
        product_name: impl Into<String>,
        price: Money<'a, Currency>,
        quantity: u32,
    ) -> Result<Self, PricingError> {
        ensure_non_negative(&price)?;

        if quantity == 0 {
            return Err(PricingError::ZeroQuantity);
        }

        let product_name = product_name.into();

        Ok(Self {
            sku: product_name.clone(),
            product_name,
            price,
            color: None,
            size: None,
            quantity,
        })
    }

    /// Creates a line for a catalog product, keyed by the product slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is zero.
    pub fn for_product(product: &Product<'a>, quantity: u32) -> Result<Self, PricingError> {
        Ok(Self::new(product.name(), *product.price(), quantity)?.with_sku(product.slug()))
    }

    /// Sets the SKU.
    #[must_use]
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = sku.into();

        self
    }

    /// Selects a colour variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the surcharge currency differs from the line price.
    pub fn with_color(mut self, color: Variant<'a>) -> Result<Self, PricingError> {
        ensure_currency(color.surcharge(), self.currency())?;

        self.color = Some(color);

        Ok(self)
    }

    /// Selects a size variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the surcharge currency differs from the line price.
    pub fn with_size(mut self, size: Variant<'a>) -> Result<Self, PricingError> {
        ensure_currency(size.surcharge(), self.currency())?;

        self.size = Some(size);

        Ok(self)
    }

    /// Changes the quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::ZeroQuantity`] for a zero quantity; the line is left unchanged.
    pub fn set_quantity(&mut self, quantity: u32) -> Result<(), PricingError> {
        if quantity == 0 {
            return Err(PricingError::ZeroQuantity);
        }

        self.quantity = quantity;

        Ok(())
    }

    /// Stock keeping unit
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Product name
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// Base price of one unit
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Selected colour
    pub fn color(&self) -> Option<&Variant<'a>> {
        self.color.as_ref()
    }

    /// Selected size
    pub fn size(&self) -> Option<&Variant<'a>> {
        self.size.as_ref()
    }

    /// Quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Currency of every amount on this line
    pub fn currency(&self) -> &'a Currency {
        self.price.currency()
    }

    /// Price of one unit including both surcharges.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the sum does not fit in minor units.
    pub fn unit_price(&self) -> Result<Money<'a, Currency>, PricingError> {
        let unit = self
            .price
            .to_minor_units()
            .checked_add(surcharge_minor(self.color.as_ref()))
            .and_then(|unit| unit.checked_add(surcharge_minor(self.size.as_ref())))
            .ok_or(PricingError::Overflow)?;

        Ok(Money::from_minor(unit, self.currency()))
    }

    /// Line total.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the total does not fit in minor units.
    pub fn total(&self) -> Result<Money<'a, Currency>, PricingError> {
        let total = self
            .unit_price()?
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or(PricingError::Overflow)?;

        Ok(Money::from_minor(total, self.currency()))
    }
}

fn surcharge_minor(variant: Option<&Variant<'_>>) -> i64 {
    variant.map_or(0, |variant| variant.surcharge().to_minor_units())
}
