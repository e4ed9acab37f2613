//! Colour and Size Variants Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    domain::catalog::{
        data::{NewColorVariant, NewSizeVariant},
        records::{
            ColorVariantRecord, ColorVariantUuid, ProductRecord, ProductUuid, SizeVariantRecord,
            SizeVariantUuid,
        },
    },
    money::{amount_param, try_get_amount},
};

const CREATE_COLOR_VARIANT_SQL: &str = include_str!("../sql/create_color_variant.sql");
const CREATE_SIZE_VARIANT_SQL: &str = include_str!("../sql/create_size_variant.sql");
const ATTACH_PRODUCT_COLOR_SQL: &str = include_str!("../sql/attach_product_color.sql");
const ATTACH_PRODUCT_SIZE_SQL: &str = include_str!("../sql/attach_product_size.sql");
const GET_PRODUCT_COLORS_SQL: &str = include_str!("../sql/get_product_colors.sql");
const GET_PRODUCT_SIZES_SQL: &str = include_str!("../sql/get_product_sizes.sql");

/// A variant row joined to the product it is attached to.
struct ProductVariantRow<T> {
    product_uuid: ProductUuid,
    variant: T,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVariantsRepository;

impl PgVariantsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_color_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: NewColorVariant,
    ) -> Result<ColorVariantRecord, sqlx::Error> {
        query_as::<Postgres, ColorVariantRecord>(CREATE_COLOR_VARIANT_SQL)
            .bind(variant.uuid.into_uuid())
            .bind(variant.name.trim())
            .bind(amount_param(variant.price, "price")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_size_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: NewSizeVariant,
    ) -> Result<SizeVariantRecord, sqlx::Error> {
        query_as::<Postgres, SizeVariantRecord>(CREATE_SIZE_VARIANT_SQL)
            .bind(variant.uuid.into_uuid())
            .bind(variant.name.trim())
            .bind(amount_param(variant.price, "price")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn attach_color(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        color: ColorVariantUuid,
    ) -> Result<(), sqlx::Error> {
        query(ATTACH_PRODUCT_COLOR_SQL)
            .bind(product.into_uuid())
            .bind(color.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn attach_size(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        size: SizeVariantUuid,
    ) -> Result<(), sqlx::Error> {
        query(ATTACH_PRODUCT_SIZE_SQL)
            .bind(product.into_uuid())
            .bind(size.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Colours attached to each of the given products.
    pub(crate) async fn get_product_colors(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<FxHashMap<ProductUuid, Vec<ColorVariantRecord>>, sqlx::Error> {
        let rows = query_as::<Postgres, ProductVariantRow<ColorVariantRecord>>(
            GET_PRODUCT_COLORS_SQL,
        )
        .bind(to_uuids(products))
        .fetch_all(&mut **tx)
        .await?;

        Ok(group_by_product(rows))
    }

    /// Sizes attached to each of the given products.
    pub(crate) async fn get_product_sizes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductUuid],
    ) -> Result<FxHashMap<ProductUuid, Vec<SizeVariantRecord>>, sqlx::Error> {
        let rows = query_as::<Postgres, ProductVariantRow<SizeVariantRecord>>(
            GET_PRODUCT_SIZES_SQL,
        )
        .bind(to_uuids(products))
        .fetch_all(&mut **tx)
        .await?;

        Ok(group_by_product(rows))
    }

    /// Fills in the colours and sizes of each product.
    pub(crate) async fn attach_variants(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &mut [ProductRecord],
    ) -> Result<(), sqlx::Error> {
        if products.is_empty() {
            return Ok(());
        }

        let uuids: Vec<ProductUuid> = products.iter().map(|product| product.uuid).collect();

        let mut colors = self.get_product_colors(tx, &uuids).await?;
        let mut sizes = self.get_product_sizes(tx, &uuids).await?;

        for product in products {
            product.colors = colors.remove(&product.uuid).unwrap_or_default();
            product.sizes = sizes.remove(&product.uuid).unwrap_or_default();
        }

        Ok(())
    }
}

fn to_uuids(products: &[ProductUuid]) -> Vec<Uuid> {
    products.iter().copied().map(ProductUuid::into_uuid).collect()
}

fn group_by_product<T>(rows: Vec<ProductVariantRow<T>>) -> FxHashMap<ProductUuid, Vec<T>> {
    let mut grouped: FxHashMap<ProductUuid, Vec<T>> = FxHashMap::default();

    for row in rows {
        grouped.entry(row.product_uuid).or_default().push(row.variant);
    }

    grouped
}

impl<'r, T> FromRow<'r, PgRow> for ProductVariantRow<T>
where
    T: FromRow<'r, PgRow>,
{
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            variant: T::from_row(row)?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ColorVariantRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ColorVariantUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            price: try_get_amount(row, "price")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for SizeVariantRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: SizeVariantUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            price: try_get_amount(row, "price")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
