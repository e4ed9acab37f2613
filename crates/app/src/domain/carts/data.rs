//! Cart Data

use crate::domain::{
    carts::records::{CartItemUuid, CartUuid},
    catalog::records::{ColorVariantUuid, ProductUuid, SizeVariantUuid},
    users::records::UserUuid,
};

/// New Cart Item Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub product_uuid: ProductUuid,
    pub color_uuid: Option<ColorVariantUuid>,
    pub size_uuid: Option<SizeVariantUuid>,
    pub quantity: u32,
}

impl NewCartItem {
    /// One unit of a product, without variants.
    #[must_use]
    pub fn new(product_uuid: ProductUuid) -> Self {
        Self {
            product_uuid,
            color_uuid: None,
            size_uuid: None,
            quantity: 1,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: ColorVariantUuid) -> Self {
        self.color_uuid = Some(color);
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: SizeVariantUuid) -> Self {
        self.size_uuid = Some(size);
        self
    }
}

/// A cart item row as inserted.
#[derive(Debug, Clone)]
pub(crate) struct CartItemInsert {
    pub uuid: CartItemUuid,
    pub cart_uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub item: NewCartItem,
}
