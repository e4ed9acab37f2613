//! Reviews
//!
//! Star ratings and the product rating derived from them.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::forms::{FieldError, FieldErrors};

/// A star rating outside `1..=5`.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("stars must be between 1 and 5, got {0}")]
pub struct InvalidStars(pub u8);

/// Star rating between one and five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stars(u8);

impl Stars {
    /// Highest rating
    pub const MAX: Stars = Stars(5);

    /// Number of stars
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Stars {
    type Error = InvalidStars;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Stars(value))
        } else {
            Err(InvalidStars(value))
        }
    }
}

/// A validated review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Rating
    pub stars: Stars,

    /// Review text
    pub content: String,
}

/// Review form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewForm {
    /// Submitted rating
    pub stars: Option<u8>,

    /// Submitted text
    pub content: String,
}

impl ReviewForm {
    /// Validates the submission.
    ///
    /// # Errors
    ///
    /// Returns the field errors when the content is blank or the rating is missing or out of
    /// range.
    pub fn validate(self) -> Result<Review, FieldErrors> {
        let mut errors = FieldErrors::default();

        errors.require("content", &self.content);

        let stars = match self.stars.map(Stars::try_from) {
            Some(Ok(stars)) => Some(stars),
            Some(Err(error)) => {
                errors.push(FieldError {
                    field: "stars",
                    message: error.to_string(),
                });
                None
            }
            None => {
                errors.push(FieldError::required("stars"));
                None
            }
        };

        match stars {
            Some(stars) if errors.is_empty() => Ok(Review {
                stars,
                content: self.content.trim().to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// Mean star rating; zero when there are no reviews.
pub fn average_rating(ratings: &[Stars]) -> Decimal {
    if ratings.is_empty() {
        return Decimal::ZERO;
    }

    let sum: u64 = ratings.iter().map(|stars| u64::from(stars.get())).sum();

    Decimal::from(sum) / Decimal::from(ratings.len())
}

/// An average rating as a percentage of five stars, for star-bar widths.
pub fn rating_percentage(average: Decimal) -> Decimal {
    average / Decimal::from(Stars::MAX.get()) * Decimal::ONE_HUNDRED
}
