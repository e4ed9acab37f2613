use std::io::{self, Write};

use clap::Args;
use storefront::receipt::Receipt;
use storefront_app::domain::{
    orders::{OrdersService, PgOrdersService, records::OrderUuid},
    users::records::UserUuid,
};
use uuid::Uuid;

use crate::cli::{ServiceArgs, output_error};

#[derive(Debug, Args)]
pub(crate) struct ShowOrderArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// UUID of the user who placed the order
    #[arg(long)]
    user_uuid: Uuid,

    /// Order UUID
    #[arg(long)]
    order_uuid: Uuid,
}

pub(crate) async fn run(args: ShowOrderArgs) -> Result<(), String> {
    let orders = PgOrdersService::new(args.service.connect().await?);

    execute(
        &orders,
        UserUuid::from_uuid(args.user_uuid),
        OrderUuid::from_uuid(args.order_uuid),
        &mut io::stdout(),
    )
    .await
}

/// Prints the order header followed by its receipt.
pub(crate) async fn execute(
    orders: &dyn OrdersService,
    user: UserUuid,
    order: OrderUuid,
    out: &mut impl Write,
) -> Result<(), String> {
    let record = orders
        .get_order(user, order)
        .await
        .map_err(|error| format!("failed to load order: {error}"))?;

    let priced = record
        .to_order()
        .map_err(|error| format!("failed to price order: {error}"))?;

    let receipt = Receipt::from_order(&priced)
        .map_err(|error| format!("failed to build receipt: {error}"))?;

    writeln!(out, "order_uuid: {}", record.uuid).map_err(output_error)?;
    writeln!(out, "placed_at: {}", record.created_at).map_err(output_error)?;
    writeln!(
        out,
        "payment_reference: {}",
        record.payment_reference.as_deref().unwrap_or("none")
    )
    .map_err(output_error)?;

    receipt
        .write_to(&mut *out)
        .map_err(|error| format!("failed to write receipt: {error}"))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use storefront_app::domain::{
        carts::records::CartUuid,
        orders::{
            MockOrdersService, OrdersServiceError,
            records::{OrderItemRecord, OrderItemUuid, OrderRecord},
        },
    };
    use testresult::TestResult;

    use super::*;

    fn order_record(user: UserUuid, order: OrderUuid) -> OrderRecord {
        OrderRecord {
            uuid: order,
            user_uuid: user,
            cart_uuid: CartUuid::new(),
            coupon_code: Some("TENOFF".to_string()),
            currency: "GBP".to_string(),
            subtotal: 260,
            discount: 10,
            grand_total: 250,
            payment_reference: Some("pay_1".to_string()),
            items: vec![OrderItemRecord {
                uuid: OrderItemUuid::new(),
                order_uuid: order,
                product_uuid: None,
                position: 1,
                product_name: "Test Product".to_string(),
                price: 100,
                color_name: Some("Red".to_string()),
                color_price: 10,
                size_name: Some("M".to_string()),
                size_price: 20,
                quantity: 2,
                total: 260,
            }],
            created_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn prints_receipt_for_order() -> TestResult {
        let user = UserUuid::new();
        let order = OrderUuid::new();

        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .withf(move |u, o| *u == user && *o == order)
            .times(1)
            .returning(move |u, o| Ok(order_record(u, o)));

        let mut out = Vec::new();

        execute(&orders, user, order, &mut out).await?;

        let out = String::from_utf8(out)?;

        assert!(out.starts_with(&format!("order_uuid: {order}\n")));
        assert!(out.contains("payment_reference: pay_1\n"));
        assert!(out.contains("Test Product"));
        assert!(out.contains("Red / M"));
        assert!(out.contains("Coupon TENOFF:"));
        assert!(out.contains("Total:"));

        Ok(())
    }

    #[tokio::test]
    async fn missing_order_is_reported() {
        let mut orders = MockOrdersService::new();

        orders
            .expect_get_order()
            .returning(|_, _| Err(OrdersServiceError::NotFound));

        let mut out = Vec::new();

        let result = execute(&orders, UserUuid::new(), OrderUuid::new(), &mut out).await;

        assert!(matches!(result, Err(message) if message.starts_with("failed to load order")));
        assert!(out.is_empty());
    }
}
