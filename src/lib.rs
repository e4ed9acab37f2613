//! Storefront
//!
//! Pricing and validation rules for a small shop: catalog variants, cart line pricing, coupons,
//! checkout snapshots, product ratings and shipping address forms. Nothing in this crate touches
//! storage; `storefront-app` persists these types and calls back into them for every total.

pub mod addresses;
pub mod cart;
pub mod catalog;
pub mod coupons;
pub mod fixtures;
pub mod forms;
pub mod items;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod reviews;
