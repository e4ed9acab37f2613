//! Wishlist Records

use jiff::Timestamp;

use crate::{
    domain::{
        catalog::records::{ProductUuid, SizeVariantUuid},
        users::records::UserUuid,
    },
    uuids::TypedUuid,
};

/// Wishlist Entry UUID
pub type WishlistEntryUuid = TypedUuid<WishlistEntryRecord>;

/// Wishlist Entry Record
#[derive(Debug, Clone)]
pub struct WishlistEntryRecord {
    pub uuid: WishlistEntryUuid,
    pub user_uuid: UserUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,

    /// Current product price, in minor units.
    pub price: u64,

    pub size_uuid: Option<SizeVariantUuid>,
    pub size_name: Option<String>,
    pub created_at: Timestamp,
}
