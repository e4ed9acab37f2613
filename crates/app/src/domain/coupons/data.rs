//! Coupon Data

use crate::domain::coupons::records::CouponUuid;

/// New Coupon Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub uuid: CouponUuid,

    /// Code the shopper types in, matched exactly.
    pub code: String,

    /// Amount taken off the cart, in minor units.
    pub discount: u64,

    /// Smallest subtotal the coupon applies to, in minor units.
    pub minimum: u64,

    pub expired: bool,
}
