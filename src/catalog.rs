//! Catalog
//!
//! Products and the colour/size variants that add a surcharge to their base price.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::pricing::{PricingError, ensure_currency, ensure_non_negative};

/// Catalog construction and lookup errors.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// The product does not offer the requested size.
    #[error("product {product} has no size {size}")]
    UnknownSize {
        /// Product name
        product: String,
        /// Requested size name
        size: String,
    },

    /// The product does not offer the requested colour.
    #[error("product {product} has no color {color}")]
    UnknownColor {
        /// Product name
        product: String,
        /// Requested colour name
        color: String,
    },

    /// Invalid amount or currency.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Builds a URL slug from a display name.
///
/// ASCII letters and digits are kept (lower-cased); every other run of characters collapses to a
/// single `-`, and the result never starts or ends with `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// A colour or size option and the amount it adds to the product price.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant<'a> {
    name: String,
    surcharge: Money<'a, Currency>,
}

impl<'a> Variant<'a> {
    /// Creates a new variant.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NegativeAmount`] when the surcharge is below zero.
    pub fn new(
        name: impl Into<String>,
        surcharge: Money<'a, Currency>,
    ) -> Result<Self, PricingError> {
        ensure_non_negative(&surcharge)?;

        Ok(Self {
            name: name.into(),
            surcharge,
        })
    }

    /// Variant name, e.g. "Red" or "M"
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Amount added to the base price
    pub fn surcharge(&self) -> &Money<'a, Currency> {
        &self.surcharge
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    name: String,
    slug: String,
    price: Money<'a, Currency>,
    colors: SmallVec<[Variant<'a>; 4]>,
    sizes: SmallVec<[Variant<'a>; 4]>,
}

impl<'a> Product<'a> {
    /// Creates a product without variants.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NegativeAmount`] when the price is below zero.
    pub fn new(name: impl Into<String>, price: Money<'a, Currency>) -> Result<Self, CatalogError> {
        ensure_non_negative(&price)?;

        let name = name.into();

        Ok(Self {
            slug: slugify(&name),
            name,
            price,
            colors: SmallVec::new(),
            sizes: SmallVec::new(),
        })
    }

    /// Offers a colour variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the surcharge currency differs from the product price.
    pub fn with_color(mut self, color: Variant<'a>) -> Result<Self, CatalogError> {
        ensure_currency(color.surcharge(), self.price.currency())?;

        self.colors.push(color);

        Ok(self)
    }

    /// Offers a size variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the surcharge currency differs from the product price.
    pub fn with_size(mut self, size: Variant<'a>) -> Result<Self, CatalogError> {
        ensure_currency(size.surcharge(), self.price.currency())?;

        self.sizes.push(size);

        Ok(self)
    }

    /// Product name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slug derived from the name
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Base price, before any variant surcharge
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Colour variants on offer
    pub fn colors(&self) -> &[Variant<'a>] {
        &self.colors
    }

    /// Size variants on offer
    pub fn sizes(&self) -> &[Variant<'a>] {
        &self.sizes
    }

    /// Look up a colour variant by name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownColor`] when the product does not offer it.
    pub fn color(&self, name: &str) -> Result<&Variant<'a>, CatalogError> {
        self.colors
            .iter()
            .find(|variant| variant.name == name)
            .ok_or_else(|| CatalogError::UnknownColor {
                product: self.name.clone(),
                color: name.to_string(),
            })
    }

    /// Look up a size variant by name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownSize`] when the product does not offer it.
    pub fn size(&self, name: &str) -> Result<&Variant<'a>, CatalogError> {
        self.sizes
            .iter()
            .find(|variant| variant.name == name)
            .ok_or_else(|| CatalogError::UnknownSize {
                product: self.name.clone(),
                size: name.to_string(),
            })
    }

    /// Price of one unit in the given size: base price plus the size surcharge.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownSize`] when the product does not offer the size.
    pub fn price_by_size(&self, size: &str) -> Result<Money<'a, Currency>, CatalogError> {
        let surcharge = *self.size(size)?.surcharge();

        self.price
            .add(surcharge)
            .map_err(|error| CatalogError::Pricing(error.into()))
    }
}
