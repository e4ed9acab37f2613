//! Wishlists service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::carts::CartsServiceError;

#[derive(Debug, Error)]
pub enum WishlistsServiceError {
    #[error("product is already in the wishlist")]
    AlreadyExists,

    #[error("wishlist entry or product not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("size is not offered for this product")]
    UnavailableVariant,

    #[error(transparent)]
    Cart(CartsServiceError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<CartsServiceError> for WishlistsServiceError {
    fn from(error: CartsServiceError) -> Self {
        match error {
            CartsServiceError::NotFound => Self::NotFound,
            CartsServiceError::UnavailableVariant => Self::UnavailableVariant,
            other => Self::Cart(other),
        }
    }
}

impl From<Error> for WishlistsServiceError {
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
