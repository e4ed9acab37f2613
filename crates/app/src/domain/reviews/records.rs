//! Review Records

use jiff::Timestamp;
use rust_decimal::Decimal;
use storefront::reviews::Stars;

use crate::{
    domain::{catalog::records::ProductUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Review UUID
pub type ReviewUuid = TypedUuid<ReviewRecord>;

/// Review Record
#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub uuid: ReviewUuid,
    pub product_uuid: ProductUuid,
    pub user_uuid: UserUuid,

    /// Reviewer's username, for display.
    pub username: String,

    pub stars: Stars,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Aggregate rating for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingSummary {
    /// Mean stars, zero without reviews.
    pub average: Decimal,

    /// `average` as a percentage of five stars.
    pub percentage: Decimal,

    pub count: usize,
}
