//! Addresses service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use storefront::forms::FieldErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AddressesServiceError {
    #[error("user already has a current address")]
    AlreadyExists,

    #[error("address or user not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("invalid address: {0}")]
    Validation(#[from] FieldErrors),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for AddressesServiceError {
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
