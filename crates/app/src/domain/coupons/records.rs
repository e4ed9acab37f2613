//! Coupon Records

use jiff::Timestamp;
use rusty_money::iso::Currency;
use storefront::{coupons::Coupon, pricing::PricingError};

use crate::{money::to_money, uuids::TypedUuid};

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponRecord>;

/// Coupon Record
#[derive(Debug, Clone)]
pub struct CouponRecord {
    pub uuid: CouponUuid,
    pub code: String,
    pub discount: u64,
    pub minimum: u64,
    pub expired: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CouponRecord {
    /// Priced coupon for cart calculations.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored amount cannot be represented in `currency`.
    pub fn to_coupon(&self, currency: &'static Currency) -> Result<Coupon<'static>, PricingError> {
        Ok(Coupon::new(
            self.code.clone(),
            to_money(self.discount, currency)?,
            to_money(self.minimum, currency)?,
        )?
        .with_expired(self.expired))
    }
}
