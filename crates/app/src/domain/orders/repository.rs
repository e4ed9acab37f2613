//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    domain::{
        carts::records::CartUuid,
        catalog::records::ProductUuid,
        orders::{
            data::{NewOrder, NewOrderItem},
            records::{OrderItemRecord, OrderItemUuid, OrderRecord, OrderUuid},
        },
        users::records::UserUuid,
    },
    money::{amount_param, count_param, try_get_amount, try_get_count},
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: NewOrder,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.user_uuid.into_uuid())
            .bind(order.cart_uuid.into_uuid())
            .bind(order.coupon_code)
            .bind(order.currency)
            .bind(amount_param(order.subtotal, "subtotal")?)
            .bind(amount_param(order.discount, "discount")?)
            .bind(amount_param(order.grand_total, "grand_total")?)
            .bind(order.payment_reference)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_order_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        user: UserUuid,
        item: NewOrderItem,
    ) -> Result<OrderItemRecord, sqlx::Error> {
        query_as::<Postgres, OrderItemRecord>(CREATE_ORDER_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .bind(item.product_uuid.into_uuid())
            .bind(count_param(item.position, "position")?)
            .bind(item.product_name)
            .bind(amount_param(item.price, "price")?)
            .bind(item.color_name)
            .bind(amount_param(item.color_price, "color_price")?)
            .bind(item.size_name)
            .bind(amount_param(item.size_price, "size_price")?)
            .bind(count_param(item.quantity, "quantity")?)
            .bind(amount_param(item.total, "total")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Fills in the items of each order, in position order.
    pub(crate) async fn attach_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &mut [OrderRecord],
    ) -> Result<(), sqlx::Error> {
        if orders.is_empty() {
            return Ok(());
        }

        let uuids: Vec<Uuid> = orders.iter().map(|order| order.uuid.into_uuid()).collect();

        let rows = query_as::<Postgres, OrderItemRecord>(GET_ORDER_ITEMS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut grouped: FxHashMap<OrderUuid, Vec<OrderItemRecord>> = FxHashMap::default();

        for row in rows {
            grouped.entry(row.order_uuid).or_default().push(row);
        }

        for order in orders {
            order.items = grouped.remove(&order.uuid).unwrap_or_default();
        }

        Ok(())
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            cart_uuid: CartUuid::from_uuid(row.try_get("cart_uuid")?),
            coupon_code: row.try_get("coupon_code")?,
            currency: row.try_get("currency")?,
            subtotal: try_get_amount(row, "subtotal")?,
            discount: try_get_amount(row, "discount")?,
            grand_total: try_get_amount(row, "grand_total")?,
            payment_reference: row.try_get("payment_reference")?,
            items: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            product_uuid: row
                .try_get::<Option<Uuid>, _>("product_uuid")?
                .map(ProductUuid::from_uuid),
            position: try_get_count(row, "position")?,
            product_name: row.try_get("product_name")?,
            price: try_get_amount(row, "price")?,
            color_name: row.try_get("color_name")?,
            color_price: try_get_amount(row, "color_price")?,
            size_name: row.try_get("size_name")?,
            size_price: try_get_amount(row, "size_price")?,
            quantity: try_get_count(row, "quantity")?,
            total: try_get_amount(row, "total")?,
        })
    }
}
