//! Cart Items Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    domain::{
        carts::{
            data::CartItemInsert,
            records::{CartItemRecord, CartItemUuid, CartItemVariant, CartUuid},
        },
        catalog::records::{ColorVariantUuid, ProductUuid, SizeVariantUuid},
        users::records::UserUuid,
    },
    money::{count_param, try_get_amount, try_get_count},
};

const GET_CART_ITEMS_SQL: &str = include_str!("../sql/get_cart_items.sql");
const ADD_CART_ITEM_SQL: &str = include_str!("../sql/add_cart_item.sql");
const UPDATE_CART_ITEM_QUANTITY_SQL: &str = include_str!("../sql/update_cart_item_quantity.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("../sql/delete_cart_item.sql");
const COUNT_UNPAID_CART_ITEMS_SQL: &str = include_str!("../sql/count_unpaid_cart_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<CartItemRecord>, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(GET_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Inserts the line, or adds to the quantity of the identical line already in the cart.
    pub(crate) async fn add_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        insert: CartItemInsert,
    ) -> Result<CartItemUuid, sqlx::Error> {
        let item: Uuid = query_scalar(ADD_CART_ITEM_SQL)
            .bind(insert.uuid.into_uuid())
            .bind(insert.cart_uuid.into_uuid())
            .bind(insert.user_uuid.into_uuid())
            .bind(insert.item.product_uuid.into_uuid())
            .bind(insert.item.color_uuid.map(ColorVariantUuid::into_uuid))
            .bind(insert.item.size_uuid.map(SizeVariantUuid::into_uuid))
            .bind(count_param(insert.item.quantity, "quantity")?)
            .fetch_one(&mut **tx)
            .await?;

        Ok(CartItemUuid::from_uuid(item))
    }

    pub(crate) async fn update_quantity(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_CART_ITEM_QUANTITY_SQL)
            .bind(item.into_uuid())
            .bind(cart.into_uuid())
            .bind(count_param(quantity, "quantity")?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_cart_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEM_SQL)
            .bind(item.into_uuid())
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn count_unpaid_cart_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_UNPAID_CART_ITEMS_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
            index: "count".to_string(),
            source: Box::new(e),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CartItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let color = match row.try_get::<Option<Uuid>, _>("color_variant_uuid")? {
            Some(uuid) => Some(CartItemVariant {
                uuid: ColorVariantUuid::from_uuid(uuid),
                name: row.try_get("color_name")?,
                price: try_get_amount(row, "color_price")?,
            }),
            None => None,
        };

        let size = match row.try_get::<Option<Uuid>, _>("size_variant_uuid")? {
            Some(uuid) => Some(CartItemVariant {
                uuid: SizeVariantUuid::from_uuid(uuid),
                name: row.try_get("size_name")?,
                price: try_get_amount(row, "size_price")?,
            }),
            None => None,
        };

        Ok(Self {
            uuid: CartItemUuid::from_uuid(row.try_get("uuid")?),
            cart_uuid: CartUuid::from_uuid(row.try_get("cart_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            product_name: row.try_get("product_name")?,
            price: try_get_amount(row, "price")?,
            color,
            size,
            quantity: try_get_count(row, "quantity")?,
            line_total: 0,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
