//! Wishlists Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    domain::{
        catalog::records::{ProductUuid, SizeVariantUuid},
        users::records::UserUuid,
        wishlists::records::{WishlistEntryRecord, WishlistEntryUuid},
    },
    money::try_get_amount,
};

const ADD_ENTRY_SQL: &str = include_str!("sql/add_entry.sql");
const REMOVE_ENTRY_SQL: &str = include_str!("sql/remove_entry.sql");
const LIST_ENTRIES_SQL: &str = include_str!("sql/list_entries.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgWishlistsRepository;

impl PgWishlistsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn add_entry(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        product: ProductUuid,
        size: Option<SizeVariantUuid>,
    ) -> Result<WishlistEntryRecord, sqlx::Error> {
        query_as::<Postgres, WishlistEntryRecord>(ADD_ENTRY_SQL)
            .bind(WishlistEntryUuid::new().into_uuid())
            .bind(user.into_uuid())
            .bind(product.into_uuid())
            .bind(size.map(SizeVariantUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn remove_entry(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        product: ProductUuid,
        size: Option<SizeVariantUuid>,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(REMOVE_ENTRY_SQL)
            .bind(user.into_uuid())
            .bind(product.into_uuid())
            .bind(size.map(SizeVariantUuid::into_uuid))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_entries(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<WishlistEntryRecord>, sqlx::Error> {
        query_as::<Postgres, WishlistEntryRecord>(LIST_ENTRIES_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for WishlistEntryRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: WishlistEntryUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            product_name: row.try_get("product_name")?,
            price: try_get_amount(row, "price")?,
            size_uuid: row
                .try_get::<Option<Uuid>, _>("size_uuid")?
                .map(SizeVariantUuid::from_uuid),
            size_name: row.try_get("size_name")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
