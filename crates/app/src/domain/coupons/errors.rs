//! Coupons service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use storefront::pricing::PricingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CouponsServiceError {
    #[error("coupon code already exists")]
    AlreadyExists,

    #[error("coupon not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CouponsServiceError {
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
