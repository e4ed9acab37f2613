//! Reviews service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use storefront::forms::FieldErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewsServiceError {
    #[error("review already exists")]
    AlreadyExists,

    #[error("review or product not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("invalid review: {0}")]
    Validation(#[from] FieldErrors),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for ReviewsServiceError {
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
