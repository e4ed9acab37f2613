//! Reviews service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use storefront::reviews::{ReviewForm, average_rating, rating_percentage};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        catalog::{records::ProductUuid, repositories::PgProductsRepository},
        reviews::{
            errors::ReviewsServiceError,
            records::{RatingSummary, ReviewRecord, ReviewUuid},
            repository::PgReviewsRepository,
        },
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgReviewsService {
    db: Db,
    repository: PgReviewsRepository,
    products: PgProductsRepository,
}

impl PgReviewsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgReviewsRepository::new(),
            products: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl ReviewsService for PgReviewsService {
    #[tracing::instrument(
        name = "reviews.service.write_review",
        skip(self, form),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn write_review(
        &self,
        user: UserUuid,
        product: ProductUuid,
        form: ReviewForm,
    ) -> Result<ReviewRecord, ReviewsServiceError> {
        let review = form.validate()?;

        let mut tx = self.db.begin().await?;

        self.products.get_product(&mut tx, product, Timestamp::now()).await?;

        let written = self
            .repository
            .write_review(&mut tx, ReviewUuid::new(), product, user, review)
            .await?;

        tx.commit().await?;

        info!(review_uuid = %written.uuid, stars = written.stars.get(), "wrote review");

        Ok(written)
    }

    async fn list_reviews(
        &self,
        product: ProductUuid,
    ) -> Result<Vec<ReviewRecord>, ReviewsServiceError> {
        let mut tx = self.db.begin().await?;

        let reviews = self.repository.list_reviews(&mut tx, product).await?;

        tx.commit().await?;

        Ok(reviews)
    }

    async fn rating(&self, product: ProductUuid) -> Result<RatingSummary, ReviewsServiceError> {
        let mut tx = self.db.begin().await?;

        let stars = self.repository.list_review_stars(&mut tx, product).await?;

        tx.commit().await?;

        let average = average_rating(&stars);

        Ok(RatingSummary {
            average,
            percentage: rating_percentage(average),
            count: stars.len(),
        })
    }
}

#[automock]
#[async_trait]
/// Product reviews. Each user has at most one review per product.
pub trait ReviewsService: Send + Sync {
    /// Validates the form and stores it as the user's review, replacing any earlier one.
    async fn write_review(
        &self,
        user: UserUuid,
        product: ProductUuid,
        form: ReviewForm,
    ) -> Result<ReviewRecord, ReviewsServiceError>;

    /// Reviews for a product, most recently written first.
    async fn list_reviews(
        &self,
        product: ProductUuid,
    ) -> Result<Vec<ReviewRecord>, ReviewsServiceError>;

    /// Average rating for a product.
    async fn rating(&self, product: ProductUuid) -> Result<RatingSummary, ReviewsServiceError>;
}
