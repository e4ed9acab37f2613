//! Reviews Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};
use storefront::reviews::{Review, Stars};

use crate::domain::{
    catalog::records::ProductUuid,
    reviews::records::{ReviewRecord, ReviewUuid},
    users::records::UserUuid,
};

const WRITE_REVIEW_SQL: &str = include_str!("sql/write_review.sql");
const LIST_REVIEWS_SQL: &str = include_str!("sql/list_reviews.sql");
const LIST_REVIEW_STARS_SQL: &str = include_str!("sql/list_review_stars.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgReviewsRepository;

impl PgReviewsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Inserts the user's review of the product, or replaces the one they already wrote.
    pub(crate) async fn write_review(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: ReviewUuid,
        product: ProductUuid,
        user: UserUuid,
        review: Review,
    ) -> Result<ReviewRecord, sqlx::Error> {
        query_as::<Postgres, ReviewRecord>(WRITE_REVIEW_SQL)
            .bind(uuid.into_uuid())
            .bind(product.into_uuid())
            .bind(user.into_uuid())
            .bind(i16::from(review.stars.get()))
            .bind(review.content)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_reviews(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Vec<ReviewRecord>, sqlx::Error> {
        query_as::<Postgres, ReviewRecord>(LIST_REVIEWS_SQL)
            .bind(product.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_review_stars(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Vec<Stars>, sqlx::Error> {
        let stars: Vec<i16> = query_scalar(LIST_REVIEW_STARS_SQL)
            .bind(product.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        stars.into_iter().map(|value| decode_stars(value, "stars")).collect()
    }
}

fn decode_stars(value: i16, col: &str) -> Result<Stars, sqlx::Error> {
    u8::try_from(value)
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: col.to_string(),
            source: Box::new(e),
        })
        .and_then(|value| {
            Stars::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
                index: col.to_string(),
                source: Box::new(e),
            })
        })
}

impl<'r> FromRow<'r, PgRow> for ReviewRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ReviewUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            username: row.try_get("username")?,
            stars: decode_stars(row.try_get("stars")?, "stars")?,
            content: row.try_get("content")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
