//! Catalog Records

use jiff::Timestamp;
use rusty_money::iso::Currency;
use storefront::catalog::{CatalogError, Product, Variant};

use crate::{money::to_money, uuids::TypedUuid};

/// Category UUID
pub type CategoryUuid = TypedUuid<CategoryRecord>;

/// Colour Variant UUID
pub type ColorVariantUuid = TypedUuid<ColorVariantRecord>;

/// Size Variant UUID
pub type SizeVariantUuid = TypedUuid<SizeVariantRecord>;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Category Record
#[derive(Debug, Clone)]
pub struct CategoryRecord {
    pub uuid: CategoryUuid,
    pub name: String,
    pub slug: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Colour Variant Record
#[derive(Debug, Clone)]
pub struct ColorVariantRecord {
    pub uuid: ColorVariantUuid,
    pub name: String,
    pub price: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Size Variant Record
#[derive(Debug, Clone)]
pub struct SizeVariantRecord {
    pub uuid: SizeVariantUuid,
    pub name: String,
    pub price: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Product Record
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub category_uuid: Option<CategoryUuid>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: u64,
    pub newest: bool,
    pub colors: Vec<ColorVariantRecord>,
    pub sizes: Vec<SizeVariantRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl ProductRecord {
    /// Builds the priced catalog product, variants included.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored amount cannot be represented in `currency`.
    pub fn to_product(
        &self,
        currency: &'static Currency,
    ) -> Result<Product<'static>, CatalogError> {
        let mut product = Product::new(self.name.clone(), to_money(self.price, currency)?)?;

        for color in &self.colors {
            product = product.with_color(color.to_variant(currency)?)?;
        }

        for size in &self.sizes {
            product = product.with_size(size.to_variant(currency)?)?;
        }

        Ok(product)
    }

    /// Finds an attached colour by UUID.
    #[must_use]
    pub fn color(&self, uuid: ColorVariantUuid) -> Option<&ColorVariantRecord> {
        self.colors.iter().find(|color| color.uuid == uuid)
    }

    /// Finds an attached size by UUID.
    #[must_use]
    pub fn size(&self, uuid: SizeVariantUuid) -> Option<&SizeVariantRecord> {
        self.sizes.iter().find(|size| size.uuid == uuid)
    }
}

impl ColorVariantRecord {
    /// Priced colour option.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored price cannot be represented in `currency`.
    pub fn to_variant(
        &self,
        currency: &'static Currency,
    ) -> Result<Variant<'static>, CatalogError> {
        Ok(Variant::new(self.name.clone(), to_money(self.price, currency)?)?)
    }
}

impl SizeVariantRecord {
    /// Priced size option.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored price cannot be represented in `currency`.
    pub fn to_variant(
        &self,
        currency: &'static Currency,
    ) -> Result<Variant<'static>, CatalogError> {
        Ok(Variant::new(self.name.clone(), to_money(self.price, currency)?)?)
    }
}
