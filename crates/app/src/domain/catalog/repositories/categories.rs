//! Categories Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::catalog::{
    data::NewCategory,
    records::{CategoryRecord, CategoryUuid},
};

const CREATE_CATEGORY_SQL: &str = include_str!("../sql/create_category.sql");
const GET_CATEGORY_BY_SLUG_SQL: &str = include_str!("../sql/get_category_by_slug.sql");
const LIST_CATEGORIES_SQL: &str = include_str!("../sql/list_categories.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCategoriesRepository;

impl PgCategoriesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: NewCategory,
        slug: &str,
    ) -> Result<CategoryRecord, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(CREATE_CATEGORY_SQL)
            .bind(category.uuid.into_uuid())
            .bind(category.name.trim())
            .bind(slug)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_category_by_slug(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        slug: &str,
    ) -> Result<CategoryRecord, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(GET_CATEGORY_BY_SLUG_SQL)
            .bind(slug)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_categories(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<CategoryRecord>, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(LIST_CATEGORIES_SQL)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CategoryRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CategoryUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
