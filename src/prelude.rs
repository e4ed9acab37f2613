//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    addresses::{AddressForm, ShippingAddress},
    cart::{Cart, CartError, LineKey},
    catalog::{CatalogError, Product, Variant, slugify},
    coupons::{Coupon, CouponRejection, apply_discount},
    fixtures::{Fixture, FixtureError},
    forms::{FieldError, FieldErrors},
    items::CartLine,
    orders::{CheckoutError, Order, OrderItem},
    pricing::{PricingError, total_price},
    receipt::{Receipt, ReceiptError},
    reviews::{Review, ReviewForm, Stars, average_rating, rating_percentage},
};
