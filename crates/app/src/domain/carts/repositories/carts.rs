//! Carts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    domain::{
        carts::records::{CartRecord, CartUuid},
        coupons::records::{CouponRecord, CouponUuid},
        users::records::UserUuid,
    },
    money::try_get_amount,
};

const ENSURE_UNPAID_CART_SQL: &str = include_str!("../sql/ensure_unpaid_cart.sql");
const LOCK_UNPAID_CART_SQL: &str = include_str!("../sql/lock_unpaid_cart.sql");
const GET_UNPAID_CART_SQL: &str = include_str!("../sql/get_unpaid_cart.sql");
const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const SET_CART_COUPON_SQL: &str = include_str!("../sql/set_cart_coupon.sql");
const MARK_CART_PAID_SQL: &str = include_str!("../sql/mark_cart_paid.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartsRepository;

impl PgCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Creates the user's unpaid cart unless one already exists.
    pub(crate) async fn ensure_unpaid_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<(), sqlx::Error> {
        query(ENSURE_UNPAID_CART_SQL)
            .bind(CartUuid::new().into_uuid())
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Locks the user's unpaid cart row until the transaction ends.
    pub(crate) async fn lock_unpaid_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<CartUuid>, sqlx::Error> {
        let cart: Option<Uuid> = query_scalar(LOCK_UNPAID_CART_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        Ok(cart.map(CartUuid::from_uuid))
    }

    pub(crate) async fn get_unpaid_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(GET_UNPAID_CART_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<CartRecord, sqlx::Error> {
        query_as::<Postgres, CartRecord>(GET_CART_SQL)
            .bind(cart.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        coupon: Option<CouponUuid>,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_CART_COUPON_SQL)
            .bind(cart.into_uuid())
            .bind(coupon.map(CouponUuid::into_uuid))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn mark_paid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_CART_PAID_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CartRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let coupon = match row.try_get::<Option<Uuid>, _>("coupon_uuid")? {
            Some(uuid) => Some(CouponRecord {
                uuid: CouponUuid::from_uuid(uuid),
                code: row.try_get("coupon_code")?,
                discount: try_get_amount(row, "coupon_discount")?,
                minimum: try_get_amount(row, "coupon_minimum")?,
                expired: row.try_get("coupon_expired")?,
                created_at: row
                    .try_get::<SqlxTimestamp, _>("coupon_created_at")?
                    .to_jiff(),
                updated_at: row
                    .try_get::<SqlxTimestamp, _>("coupon_updated_at")?
                    .to_jiff(),
            }),
            None => None,
        };

        Ok(Self {
            uuid: CartUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            coupon,
            is_paid: row.try_get("is_paid")?,
            paid_at: row
                .try_get::<Option<SqlxTimestamp>, _>("paid_at")?
                .map(SqlxTimestamp::to_jiff),
            items: Vec::new(),
            subtotal: 0,
            discount: 0,
            total: 0,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
