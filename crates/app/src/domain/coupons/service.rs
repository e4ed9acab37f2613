//! Coupons service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::coupons::{
        data::NewCoupon, errors::CouponsServiceError, records::CouponRecord,
        repository::PgCouponsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    repository: PgCouponsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCouponsRepository::new(),
        }
    }
}

#[async_trait]
impl CouponsService for PgCouponsService {
    #[tracing::instrument(
        name = "coupons.service.create_coupon",
        skip(self, coupon),
        fields(coupon_uuid = %coupon.uuid),
        err
    )]
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_coupon(&mut tx, coupon).await?;

        tx.commit().await?;

        info!(code = %created.code, "created coupon");

        Ok(created)
    }

    async fn get_coupon_by_code(&self, code: String) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let coupon = self.repository.get_coupon_by_code(&mut tx, &code).await?;

        tx.commit().await?;

        Ok(coupon)
    }

    async fn list_coupons(&self) -> Result<Vec<CouponRecord>, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let coupons = self.repository.list_coupons(&mut tx).await?;

        tx.commit().await?;

        Ok(coupons)
    }

    #[tracing::instrument(name = "coupons.service.expire_coupon", skip(self), err)]
    async fn expire_coupon(&self, code: String) -> Result<CouponRecord, CouponsServiceError> {
        let mut tx = self.db.begin().await?;

        let expired = self.repository.expire_coupon(&mut tx, &code).await?;

        tx.commit().await?;

        info!(code = %expired.code, "expired coupon");

        Ok(expired)
    }
}

#[automock]
#[async_trait]
/// Coupon administration.
pub trait CouponsService: Send + Sync {
    /// Creates a coupon.
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError>;

    /// Retrieve a coupon by its exact code.
    async fn get_coupon_by_code(&self, code: String) -> Result<CouponRecord, CouponsServiceError>;

    /// All coupons, by code.
    async fn list_coupons(&self) -> Result<Vec<CouponRecord>, CouponsServiceError>;

    /// Marks a coupon expired; carts already holding it stop receiving the discount.
    async fn expire_coupon(&self, code: String) -> Result<CouponRecord, CouponsServiceError>;
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::GBP};
    use testresult::TestResult;

    use crate::{domain::coupons::records::CouponUuid, test::TestContext};

    use super::*;

    fn new_coupon(code: &str, discount: u64, minimum: u64) -> NewCoupon {
        NewCoupon {
            uuid: CouponUuid::new(),
            code: code.to_string(),
            discount,
            minimum,
            expired: false,
        }
    }

    #[tokio::test]
    async fn create_coupon_returns_record() -> TestResult {
        let ctx = TestContext::new().await;

        let coupon = ctx
            .coupons
            .create_coupon(new_coupon(" DISCOUNT50 ", 50, 100))
            .await?;

        assert_eq!(coupon.code, "DISCOUNT50");
        assert_eq!(coupon.discount, 50);
        assert_eq!(coupon.minimum, 100);
        assert!(!coupon.expired);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_code_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.coupons.create_coupon(new_coupon("SAVE", 50, 0)).await?;

        let result = ctx.coupons.create_coupon(new_coupon("SAVE", 75, 0)).await;

        assert!(
            matches!(result, Err(CouponsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unknown_code_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.coupons.get_coupon_by_code("NOPE".to_string()).await;

        assert!(
            matches!(result, Err(CouponsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn expire_coupon_marks_it_expired() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.coupons.create_coupon(new_coupon("SUMMER", 500, 0)).await?;

        ctx.coupons.expire_coupon("SUMMER".to_string()).await?;

        let coupon = ctx.coupons.get_coupon_by_code("SUMMER".to_string()).await?;

        assert!(coupon.expired);
        assert!(coupon.to_coupon(GBP)?.is_expired());

        Ok(())
    }

    #[tokio::test]
    async fn list_coupons_orders_by_code() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.coupons.create_coupon(new_coupon("ZED", 1, 0)).await?;
        ctx.coupons.create_coupon(new_coupon("ALPHA", 1, 0)).await?;

        let codes: Vec<String> = ctx
            .coupons
            .list_coupons()
            .await?
            .into_iter()
            .map(|coupon| coupon.code)
            .collect();

        assert_eq!(codes, vec!["ALPHA".to_string(), "ZED".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn to_coupon_prices_amounts_in_currency() -> TestResult {
        let ctx = TestContext::new().await;

        let record = ctx
            .coupons
            .create_coupon(new_coupon("DISCOUNT50", 50, 100))
            .await?;

        let coupon = record.to_coupon(GBP)?;

        assert_eq!(coupon.discount(), &Money::from_minor(50, GBP));
        assert_eq!(coupon.minimum(), &Money::from_minor(100, GBP));

        Ok(())
    }
}
