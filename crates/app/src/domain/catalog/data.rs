//! Catalog Data

use crate::domain::catalog::records::{
    CategoryUuid, ColorVariantUuid, ProductUuid, SizeVariantUuid,
};

/// New Category Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub uuid: CategoryUuid,
    pub name: String,
}

/// New Colour or Size Variant Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewVariant<T> {
    pub uuid: T,
    pub name: String,
    pub price: u64,
}

/// New Colour Variant Data
pub type NewColorVariant = NewVariant<ColorVariantUuid>;

/// New Size Variant Data
pub type NewSizeVariant = NewVariant<SizeVariantUuid>;

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub category_uuid: Option<CategoryUuid>,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub newest: bool,
    pub colors: Vec<ColorVariantUuid>,
    pub sizes: Vec<SizeVariantUuid>,
}
