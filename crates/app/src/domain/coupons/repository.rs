//! Coupons Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    domain::coupons::{
        data::NewCoupon,
        records::{CouponRecord, CouponUuid},
    },
    money::{amount_param, try_get_amount},
};

const CREATE_COUPON_SQL: &str = include_str!("sql/create_coupon.sql");
const GET_COUPON_SQL: &str = include_str!("sql/get_coupon.sql");
const GET_COUPON_BY_CODE_SQL: &str = include_str!("sql/get_coupon_by_code.sql");
const LIST_COUPONS_SQL: &str = include_str!("sql/list_coupons.sql");
const EXPIRE_COUPON_SQL: &str = include_str!("sql/expire_coupon.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: NewCoupon,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(CREATE_COUPON_SQL)
            .bind(coupon.uuid.into_uuid())
            .bind(coupon.code.trim())
            .bind(amount_param(coupon.discount, "discount")?)
            .bind(amount_param(coupon.minimum, "minimum")?)
            .bind(coupon.expired)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(GET_COUPON_SQL)
            .bind(coupon.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_coupon_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(GET_COUPON_BY_CODE_SQL)
            .bind(code.trim())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<CouponRecord>, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(LIST_COUPONS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn expire_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(EXPIRE_COUPON_SQL)
            .bind(code.trim())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CouponUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            discount: try_get_amount(row, "discount")?,
            minimum: try_get_amount(row, "minimum")?,
            expired: row.try_get("expired")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
