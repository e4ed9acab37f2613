//! Carts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use storefront::{
    cart::CartError, coupons::CouponRejection, orders::CheckoutError, pricing::PricingError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("cart item already exists")]
    AlreadyExists,

    #[error("cart or cart item not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("product does not offer the selected variant")]
    UnavailableVariant,

    #[error("cart is empty")]
    EmptyCart,

    /// The priced cart no longer lines up with its stored items.
    #[error("cart items do not match the checkout snapshot")]
    SnapshotMismatch,

    /// Shown to the shopper as-is.
    #[error(transparent)]
    Coupon(#[from] CouponRejection),

    #[error(transparent)]
    Cart(CartError),

    #[error(transparent)]
    Checkout(CheckoutError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<CartError> for CartsServiceError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::Coupon(rejection) => Self::Coupon(rejection),
            CartError::Pricing(error) => Self::Pricing(error),
            error => Self::Cart(error),
        }
    }
}

impl From<CheckoutError> for CartsServiceError {
    fn from(error: CheckoutError) -> Self {
        match error {
            CheckoutError::EmptyCart => Self::EmptyCart,
            CheckoutError::Cart(error) => error.into(),
            CheckoutError::Pricing(error) => Self::Pricing(error),
            error => Self::Checkout(error),
        }
    }
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
