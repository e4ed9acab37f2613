//! Fixtures
//!
//! A fixture set is one YAML file describing a currency, colour and size variants, products,
//! coupons and carts built from them.

use std::{fs, path::Path};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    catalog::{CatalogError, Product, Variant},
    coupons::Coupon,
    fixtures::{
        carts::CartFixture,
        products::{CouponFixture, ProductFixture, VariantFixture, parse_money},
    },
    items::CartLine,
    pricing::PricingError,
};

pub mod carts;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between the fixture and one of its prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Colour variant not found
    #[error("Color not found: {0}")]
    ColorNotFound(String),

    /// Size variant not found
    #[error("Size not found: {0}")]
    SizeNotFound(String),

    /// Coupon not found
    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    /// Cart not found
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// Invalid catalog data
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Invalid amount
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Raw YAML document
#[derive(Debug, Deserialize)]
struct FixtureFile {
    currency: String,

    #[serde(default)]
    colors: FxHashMap<String, VariantFixture>,

    #[serde(default)]
    sizes: FxHashMap<String, VariantFixture>,

    #[serde(default)]
    products: FxHashMap<String, ProductFixture>,

    #[serde(default)]
    coupons: FxHashMap<String, CouponFixture>,

    #[serde(default)]
    carts: FxHashMap<String, CartFixture>,
}

/// A product together with the catalog details that live outside the pricing model.
#[derive(Debug, Clone)]
pub struct FixtureProduct {
    /// Priced product with its variants
    pub product: Product<'static>,

    /// Category name
    pub category: Option<String>,

    /// Description
    pub description: String,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    currency: &'static Currency,
    colors: FxHashMap<String, Variant<'static>>,
    sizes: FxHashMap<String, Variant<'static>>,
    products: FxHashMap<String, FixtureProduct>,
    coupons: FxHashMap<String, Coupon<'static>>,
    carts: FxHashMap<String, CartFixture>,
}

impl Fixture {
    /// Load a named fixture set from `./fixtures/{name}.yml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are invalid.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_path(Path::new("./fixtures").join(format!("{name}.yml")))
    }

    /// Load a fixture set from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parse a fixture set from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed, a price is malformed or in another
    /// currency, or a product refers to a variant that is not defined.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        let file: FixtureFile = serde_norway::from_str(contents)?;

        let currency = rusty_money::iso::find(&file.currency)
            .ok_or_else(|| FixtureError::UnknownCurrency(file.currency.clone()))?;

        let colors = parse_variants(file.colors, currency)?;
        let sizes = parse_variants(file.sizes, currency)?;

        let mut products = FxHashMap::default();

        for (key, fixture) in file.products {
            let mut product = Product::new(fixture.name, parse_money(&fixture.price, currency)?)?;

            for color_key in &fixture.colors {
                let color = colors
                    .get(color_key)
                    .ok_or_else(|| FixtureError::ColorNotFound(color_key.clone()))?;

                product = product.with_color(color.clone())?;
            }

            for size_key in &fixture.sizes {
                let size = sizes
                    .get(size_key)
                    .ok_or_else(|| FixtureError::SizeNotFound(size_key.clone()))?;

                product = product.with_size(size.clone())?;
            }

            products.insert(
                key,
                FixtureProduct {
                    product,
                    category: fixture.category,
                    description: fixture.description,
                },
            );
        }

        let mut coupons = FxHashMap::default();

        for (key, fixture) in file.coupons {
            let coupon = Coupon::new(
                fixture.code,
                parse_money(&fixture.discount, currency)?,
                parse_money(&fixture.minimum, currency)?,
            )?
            .with_expired(fixture.expired);

            coupons.insert(key, coupon);
        }

        Ok(Self {
            currency,
            colors,
            sizes,
            products,
            coupons,
            carts: file.carts,
        })
    }

    /// Currency every price in the set is in
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Look up a product by fixture key.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::ProductNotFound`] for an unknown key.
    pub fn product(&self, key: &str) -> Result<&Product<'static>, FixtureError> {
        self.products
            .get(key)
            .map(|fixture| &fixture.product)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Every product, ordered by name.
    pub fn products(&self) -> Vec<&FixtureProduct> {
        let mut products: Vec<_> = self.products.values().collect();

        products.sort_by(|a, b| a.product.name().cmp(b.product.name()));

        products
    }

    /// Distinct category names, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self
            .products
            .values()
            .filter_map(|fixture| fixture.category.as_deref())
            .collect();

        categories.sort_unstable();
        categories.dedup();

        categories
    }

    /// Every colour variant, ordered by name.
    pub fn colors(&self) -> Vec<&Variant<'static>> {
        sorted_variants(&self.colors)
    }

    /// Every size variant, ordered by name.
    pub fn sizes(&self) -> Vec<&Variant<'static>> {
        sorted_variants(&self.sizes)
    }

    /// Look up a coupon by fixture key.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::CouponNotFound`] for an unknown key.
    pub fn coupon(&self, key: &str) -> Result<&Coupon<'static>, FixtureError> {
        self.coupons
            .get(key)
            .ok_or_else(|| FixtureError::CouponNotFound(key.to_string()))
    }

    /// Every coupon, ordered by code.
    pub fn coupons(&self) -> Vec<&Coupon<'static>> {
        let mut coupons: Vec<_> = self.coupons.values().collect();

        coupons.sort_by(|a, b| a.code().cmp(b.code()));

        coupons
    }

    /// Build a fresh cart from a cart fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart, or anything it refers to, is not defined, or if its coupon
    /// is rejected.
    pub fn cart(&self, key: &str) -> Result<Cart<'static>, FixtureError> {
        let fixture = self
            .carts
            .get(key)
            .ok_or_else(|| FixtureError::CartNotFound(key.to_string()))?;

        let mut cart = Cart::new(self.currency);

        for item in &fixture.items {
            let product = self.product(&item.product)?;
            let mut line = CartLine::for_product(product, item.quantity)?;

            if let Some(color_key) = &item.color {
                let color = self
                    .colors
                    .get(color_key)
                    .ok_or_else(|| FixtureError::ColorNotFound(color_key.clone()))?;

                line = line.with_color(product.color(color.name())?.clone())?;
            }

            if let Some(size_key) = &item.size {
                let size = self
                    .sizes
                    .get(size_key)
                    .ok_or_else(|| FixtureError::SizeNotFound(size_key.clone()))?;

                line = line.with_size(product.size(size.name())?.clone())?;
            }

            cart.add_line(line)?;
        }

        if let Some(coupon_key) = &fixture.coupon {
            cart.apply_coupon(self.coupon(coupon_key)?.clone())?;
        }

        Ok(cart)
    }
}

fn parse_variants(
    fixtures: FxHashMap<String, VariantFixture>,
    currency: &'static Currency,
) -> Result<FxHashMap<String, Variant<'static>>, FixtureError> {
    fixtures
        .into_iter()
        .map(|(key, fixture)| {
            let variant = Variant::new(fixture.name, parse_money(&fixture.price, currency)?)?;

            Ok::<_, FixtureError>((key, variant))
        })
        .collect()
}

fn sorted_variants<'a>(variants: &'a FxHashMap<String, Variant<'static>>) -> Vec<&'a Variant<'static>> {
    let mut variants: Vec<_> = variants.values().collect();

    variants.sort_by(|a, b| a.name().cmp(b.name()));

    variants
}
