//! Products Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    domain::catalog::{
        data::NewProduct,
        records::{CategoryUuid, ProductRecord, ProductUuid},
    },
    money::{amount_param, try_get_amount},
};

const CREATE_PRODUCT_SQL: &str = include_str!("../sql/create_product.sql");
const GET_PRODUCT_SQL: &str = include_str!("../sql/get_product.sql");
const GET_PRODUCT_BY_SLUG_SQL: &str = include_str!("../sql/get_product_by_slug.sql");
const LIST_PRODUCTS_SQL: &str = include_str!("../sql/list_products.sql");
const RELATED_PRODUCTS_SQL: &str = include_str!("../sql/related_products.sql");
const UPDATE_PRODUCT_PRICE_SQL: &str = include_str!("../sql/update_product_price.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("../sql/delete_product.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: &NewProduct,
        slug: &str,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.category_uuid.map(CategoryUuid::into_uuid))
            .bind(product.name.trim())
            .bind(slug)
            .bind(product.description.as_str())
            .bind(amount_param(product.price, "price")?)
            .bind(product.newest)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        point_in_time: Timestamp,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(SqlxTimestamp::from(point_in_time))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_product_by_slug(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        slug: &str,
        point_in_time: Timestamp,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_BY_SLUG_SQL)
            .bind(slug)
            .bind(SqlxTimestamp::from(point_in_time))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: Option<CategoryUuid>,
        point_in_time: Timestamp,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_PRODUCTS_SQL)
            .bind(category.map(CategoryUuid::into_uuid))
            .bind(SqlxTimestamp::from(point_in_time))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn related_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        point_in_time: Timestamp,
        limit: i64,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(RELATED_PRODUCTS_SQL)
            .bind(product.into_uuid())
            .bind(SqlxTimestamp::from(point_in_time))
            .bind(limit)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_product_price(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        price: u64,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_PRICE_SQL)
            .bind(product.into_uuid())
            .bind(amount_param(price, "price")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            category_uuid: row
                .try_get::<Option<Uuid>, _>("category_uuid")?
                .map(CategoryUuid::from_uuid),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            price: try_get_amount(row, "price")?,
            newest: row.try_get("newest")?,
            colors: Vec::new(),
            sizes: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
