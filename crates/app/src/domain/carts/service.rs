//! Carts service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rusty_money::iso::Currency;
use sqlx::{Postgres, Transaction};
use storefront::{
    catalog::Variant, coupons::CouponRejection, orders::Order, pricing::PricingError,
};
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{
            data::{CartItemInsert, NewCartItem},
            errors::CartsServiceError,
            records::{CartItemUuid, CartRecord, CartUuid},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        catalog::repositories::{PgProductsRepository, PgVariantsRepository},
        coupons::repository::PgCouponsRepository,
        orders::{
            data::{NewOrder, NewOrderItem},
            records::{OrderItemUuid, OrderRecord, OrderUuid},
            repository::PgOrdersRepository,
        },
        users::records::UserUuid,
    },
    money::to_amount,
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    currency: &'static Currency,
    carts: PgCartsRepository,
    items: PgCartItemsRepository,
    products: PgProductsRepository,
    variants: PgVariantsRepository,
    coupons: PgCouponsRepository,
    orders: PgOrdersRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db, currency: &'static Currency) -> Self {
        Self {
            db,
            currency,
            carts: PgCartsRepository::new(),
            items: PgCartItemsRepository::new(),
            products: PgProductsRepository::new(),
            variants: PgVariantsRepository::new(),
            coupons: PgCouponsRepository::new(),
            orders: PgOrdersRepository::new(),
        }
    }

    /// Adds an item to the user's unpaid cart inside an open transaction.
    ///
    /// The product must be live and offer the selected colour and size.
    pub(crate) async fn add_item_in(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartUuid, CartsServiceError> {
        if item.quantity == 0 {
            return Err(PricingError::ZeroQuantity.into());
        }

        let mut product = self
            .products
            .get_product(tx, item.product_uuid, Timestamp::now())
            .await?;

        self.variants
            .attach_variants(tx, std::slice::from_mut(&mut product))
            .await?;

        let color_offered = item.color_uuid.is_none_or(|color| product.color(color).is_some());
        let size_offered = item.size_uuid.is_none_or(|size| product.size(size).is_some());

        if !color_offered || !size_offered {
            return Err(CartsServiceError::UnavailableVariant);
        }

        self.carts.ensure_unpaid_cart(tx, user).await?;

        let cart = self.carts.lock_unpaid_cart(tx, user).await?.ok_or(CartsServiceError::NotFound)?;

        self.items
            .add_cart_item(
                tx,
                CartItemInsert {
                    uuid: CartItemUuid::new(),
                    cart_uuid: cart,
                    user_uuid: user,
                    item,
                },
            )
            .await?;

        Ok(cart)
    }

    /// The user's unpaid cart, created if missing, with its items priced.
    async fn unpaid_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        self.carts.ensure_unpaid_cart(tx, user).await?;

        let cart = self.carts.get_unpaid_cart(tx, user).await?;

        self.load_items(tx, cart).await
    }

    async fn load_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut cart: CartRecord,
    ) -> Result<CartRecord, CartsServiceError> {
        cart.items = self.items.get_cart_items(tx, cart.uuid).await?;

        self.price(cart)
    }

    /// Fills in line totals and cart totals from current prices.
    fn price(&self, mut cart: CartRecord) -> Result<CartRecord, CartsServiceError> {
        for item in &mut cart.items {
            item.line_total = to_amount(&item.to_line(self.currency)?.total()?)?;
        }

        let priced = cart.to_cart(self.currency)?;

        cart.subtotal = to_amount(&priced.subtotal()?)?;
        cart.total = to_amount(&priced.total()?)?;
        cart.discount = to_amount(&priced.discount()?)?;

        Ok(cart)
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn current_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let cart = self.unpaid_cart(&mut tx, user).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn get_cart(
        &self,
        user: UserUuid,
        cart: CartUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let cart = self.carts.get_cart(&mut tx, cart).await?;
        let cart = self.load_items(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, item),
        fields(user_uuid = %user, product_uuid = %item.product_uuid),
        err
    )]
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let cart = self.add_item_in(&mut tx, user, item).await?;
        let cart = self.carts.get_cart(&mut tx, cart).await?;
        let cart = self.load_items(&mut tx, cart).await?;

        tx.commit().await?;

        info!(cart_uuid = %cart.uuid, lines = cart.len(), "added item to cart");

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.update_quantity",
        skip(self),
        fields(user_uuid = %user, item_uuid = %item),
        err
    )]
    async fn update_quantity(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<CartRecord, CartsServiceError> {
        if quantity == 0 {
            return Err(PricingError::ZeroQuantity.into());
        }

        let mut tx = self.db.begin_user_transaction(user).await?;

        let cart = self
            .carts
            .lock_unpaid_cart(&mut tx, user)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let rows_affected = self.items.update_quantity(&mut tx, cart, item, quantity).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        let cart = self.carts.get_cart(&mut tx, cart).await?;
        let cart = self.load_items(&mut tx, cart).await?;

        tx.commit().await?;

        info!(quantity, "updated cart item quantity");

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(user_uuid = %user, item_uuid = %item),
        err
    )]
    async fn remove_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let cart = self
            .carts
            .lock_unpaid_cart(&mut tx, user)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let rows_affected = self.items.delete_cart_item(&mut tx, cart, item).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        let cart = self.carts.get_cart(&mut tx, cart).await?;
        let cart = self.load_items(&mut tx, cart).await?;

        tx.commit().await?;

        info!("removed cart item");

        Ok(cart)
    }

    async fn cart_count(&self, user: UserUuid) -> Result<u64, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let count = self.items.count_unpaid_cart_items(&mut tx, user).await?;

        tx.commit().await?;

        Ok(count)
    }

    #[tracing::instrument(
        name = "carts.service.apply_coupon",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn apply_coupon(
        &self,
        user: UserUuid,
        code: String,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        self.carts.ensure_unpaid_cart(&mut tx, user).await?;

        let cart = self
            .carts
            .lock_unpaid_cart(&mut tx, user)
            .await?
            .ok_or(CartsServiceError::NotFound)?;
        let cart = self.carts.get_cart(&mut tx, cart).await?;
        let mut cart = self.load_items(&mut tx, cart).await?;

        let coupon = match self.coupons.get_coupon_by_code(&mut tx, &code).await {
            Ok(coupon) => coupon,
            Err(sqlx::Error::RowNotFound) => return Err(CouponRejection::Unknown.into()),
            Err(error) => return Err(error.into()),
        };

        cart.to_cart(self.currency)?
            .apply_coupon(coupon.to_coupon(self.currency)?)?;

        self.carts
            .set_coupon(&mut tx, cart.uuid, Some(coupon.uuid))
            .await?;

        cart.coupon = Some(coupon);

        let cart = self.price(cart)?;

        tx.commit().await?;

        info!(cart_uuid = %cart.uuid, code = %code, discount = cart.discount, "applied coupon");

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.remove_coupon",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn remove_coupon(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        self.carts.ensure_unpaid_cart(&mut tx, user).await?;

        let cart = self
            .carts
            .lock_unpaid_cart(&mut tx, user)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        self.carts.set_coupon(&mut tx, cart, None).await?;

        let cart = self.unpaid_cart(&mut tx, user).await?;

        tx.commit().await?;

        info!(cart_uuid = %cart.uuid, "removed coupon");

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.checkout",
        skip(self, payment_reference),
        fields(user_uuid = %user),
        err
    )]
    async fn checkout(
        &self,
        user: UserUuid,
        payment_reference: Option<String>,
    ) -> Result<OrderRecord, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let cart_uuid = self
            .carts
            .lock_unpaid_cart(&mut tx, user)
            .await?
            .ok_or(CartsServiceError::EmptyCart)?;

        let cart = self.carts.get_cart(&mut tx, cart_uuid).await?;
        let cart = self.load_items(&mut tx, cart).await?;

        let order = Order::checkout(&mut cart.to_cart(self.currency)?, payment_reference)?;

        let mut placed = self
            .orders
            .create_order(
                &mut tx,
                NewOrder {
                    uuid: OrderUuid::new(),
                    user_uuid: user,
                    cart_uuid,
                    coupon_code: order.coupon_code().map(str::to_string),
                    currency: self.currency.iso_alpha_code,
                    subtotal: to_amount(&order.subtotal())?,
                    discount: to_amount(&order.discount())?,
                    grand_total: to_amount(&order.grand_total())?,
                    payment_reference: order.payment_reference().map(str::to_string),
                },
            )
            .await?;

        if order.items().len() != cart.items.len() {
            return Err(CartsServiceError::SnapshotMismatch);
        }

        for (position, (ordered, item)) in (1_u32..).zip(order.items().iter().zip(&cart.items)) {
            let line = ordered.line();

            if line.sku() != item.sku() {
                return Err(CartsServiceError::SnapshotMismatch);
            }

            let created = self
                .orders
                .create_order_item(
                    &mut tx,
                    placed.uuid,
                    user,
                    NewOrderItem {
                        uuid: OrderItemUuid::new(),
                        product_uuid: item.product_uuid,
                        position,
                        product_name: line.product_name().to_string(),
                        price: to_amount(line.price())?,
                        color_name: line.color().map(|color| color.name().to_string()),
                        color_price: surcharge_amount(line.color())?,
                        size_name: line.size().map(|size| size.name().to_string()),
                        size_price: surcharge_amount(line.size())?,
                        quantity: line.quantity(),
                        total: to_amount(&ordered.total())?,
                    },
                )
                .await?;

            placed.items.push(created);
        }

        self.carts.mark_paid(&mut tx, cart_uuid).await?;

        tx.commit().await?;

        info!(
            order_uuid = %placed.uuid,
            cart_uuid = %cart_uuid,
            grand_total = placed.grand_total,
            "checked out cart"
        );

        Ok(placed)
    }
}

fn surcharge_amount(variant: Option<&Variant<'_>>) -> Result<u64, PricingError> {
    variant.map_or(Ok(0), |variant| to_amount(variant.surcharge()))
}

#[automock]
#[async_trait]
/// Shopping cart operations, always on behalf of one user.
pub trait CartsService: Send + Sync {
    /// The user's unpaid cart, created on first use.
    async fn current_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;

    /// Retrieve one of the user's carts, paid or not.
    async fn get_cart(
        &self,
        user: UserUuid,
        cart: CartUuid,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Adds an item, merging it into an identical line when there is one.
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Sets the quantity of a line in the unpaid cart.
    async fn update_quantity(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        quantity: u32,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Removes a line from the unpaid cart.
    async fn remove_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Number of lines in the unpaid cart.
    async fn cart_count(&self, user: UserUuid) -> Result<u64, CartsServiceError>;

    /// Applies a coupon to the unpaid cart. The cart is left unchanged when the coupon is
    /// rejected.
    async fn apply_coupon(
        &self,
        user: UserUuid,
        code: String,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Removes the coupon from the unpaid cart.
    async fn remove_coupon(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;

    /// Turns the unpaid cart into an order and marks the cart paid.
    async fn checkout(
        &self,
        user: UserUuid,
        payment_reference: Option<String>,
    ) -> Result<OrderRecord, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use storefront::cart::CartError;
    use testresult::TestResult;

    use crate::domain::{
        catalog::{
            CatalogService, CatalogServiceError,
            data::NewProduct,
            records::{ColorVariantUuid, ProductUuid},
        },
        coupons::{CouponsService, data::NewCoupon, records::CouponUuid},
        orders::OrdersService,
    };
    use crate::test::{TestCatalog, TestContext};

    use super::*;

    async fn create_coupon(
        ctx: &TestContext,
        code: &str,
        discount: u64,
        minimum: u64,
    ) -> TestResult {
        ctx.coupons
            .create_coupon(NewCoupon {
                uuid: CouponUuid::new(),
                code: code.to_string(),
                discount,
                minimum,
                expired: false,
            })
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn current_cart_is_created_once() -> TestResult {
        let ctx = TestContext::new().await;

        let first = ctx.carts.current_cart(ctx.user_uuid).await?;
        let second = ctx.carts.current_cart(ctx.user_uuid).await?;

        assert_eq!(first.uuid, second.uuid);
        assert!(first.is_empty());
        assert_eq!(first.subtotal, 0);
        assert_eq!(first.total, 0);
        assert!(!first.is_paid);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_prices_line_with_variants() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        let item = NewCartItem::new(catalog.product)
            .with_color(catalog.red)
            .with_size(catalog.medium);

        ctx.carts.add_item(ctx.user_uuid, item.clone()).await?;
        let cart = ctx.carts.add_item(ctx.user_uuid, item).await?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.items[0].line_total, 260);
        assert_eq!(cart.subtotal, 260);
        assert_eq!(cart.total, 260);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_without_surcharge_prices_at_base_plus_size() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        let cart = ctx
            .carts
            .add_item(
                ctx.user_uuid,
                NewCartItem::new(catalog.product)
                    .with_color(catalog.navy)
                    .with_size(catalog.large),
            )
            .await?;

        assert_eq!(cart.items[0].line_total, 150);
        assert_eq!(
            cart.items[0].color.as_ref().map(|color| color.name.as_str()),
            Some("Navy")
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_item_with_different_size_adds_line() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        ctx.carts
            .add_item(ctx.user_uuid, NewCartItem::new(catalog.product).with_size(catalog.small))
            .await?;

        let cart = ctx
            .carts
            .add_item(ctx.user_uuid, NewCartItem::new(catalog.product).with_size(catalog.medium))
            .await?;

        assert_eq!(cart.len(), 2);
        assert_eq!(ctx.carts.cart_count(ctx.user_uuid).await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_with_unoffered_color_returns_unavailable_variant() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        let result = ctx
            .carts
            .add_item(
                ctx.user_uuid,
                NewCartItem::new(catalog.product).with_color(ColorVariantUuid::new()),
            )
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::UnavailableVariant)),
            "expected UnavailableVariant, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn add_unknown_product_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .carts
            .add_item(ctx.user_uuid, NewCartItem::new(ProductUuid::new()))
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn update_quantity_changes_line_total() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        let cart = ctx
            .carts
            .add_item(ctx.user_uuid, NewCartItem::new(catalog.product))
            .await?;

        let cart = ctx
            .carts
            .update_quantity(ctx.user_uuid, cart.items[0].uuid, 3)
            .await?;

        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.subtotal, 300);

        Ok(())
    }

    #[tokio::test]
    async fn update_quantity_to_zero_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        let cart = ctx
            .carts
            .add_item(ctx.user_uuid, NewCartItem::new(catalog.product))
            .await?;

        let result = ctx
            .carts
            .update_quantity(ctx.user_uuid, cart.items[0].uuid, 0)
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::Pricing(PricingError::ZeroQuantity))),
            "expected ZeroQuantity, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_item_empties_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        let cart = ctx
            .carts
            .add_item(ctx.user_uuid, NewCartItem::new(catalog.product))
            .await?;

        let cart = ctx.carts.remove_item(ctx.user_uuid, cart.items[0].uuid).await?;

        assert!(cart.is_empty());
        assert_eq!(ctx.carts.cart_count(ctx.user_uuid).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn apply_coupon_discounts_total() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        create_coupon(&ctx, "DISCOUNT50", 50, 100).await?;

        ctx.carts
            .add_item(ctx.user_uuid, NewCartItem::new(catalog.product))
            .await?;

        let cart = ctx
            .carts
            .apply_coupon(ctx.user_uuid, "DISCOUNT50".to_string())
            .await?;

        assert_eq!(cart.coupon_code(), Some("DISCOUNT50"));
        assert_eq!(cart.subtotal, 100);
        assert_eq!(cart.discount, 50);
        assert_eq!(cart.total, 50);

        Ok(())
    }

    #[tokio::test]
    async fn apply_unknown_coupon_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx.carts.apply_coupon(ctx.user_uuid, "NOPE".to_string()).await;

        assert!(
            matches!(result, Err(CartsServiceError::Coupon(CouponRejection::Unknown))),
            "expected Unknown, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn coupon_below_minimum_leaves_cart_unchanged() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        create_coupon(&ctx, "WELCOME10", 1000, 5000).await?;

        ctx.carts
            .add_item(ctx.user_uuid, NewCartItem::new(catalog.product))
            .await?;

        let result = ctx
            .carts
            .apply_coupon(ctx.user_uuid, "WELCOME10".to_string())
            .await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::Coupon(CouponRejection::BelowMinimum { .. }))
            ),
            "expected BelowMinimum, got {result:?}"
        );

        let cart = ctx.carts.current_cart(ctx.user_uuid).await?;

        assert!(cart.coupon.is_none());
        assert_eq!(cart.total, 100);

        Ok(())
    }

    #[tokio::test]
    async fn expired_coupon_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        create_coupon(&ctx, "SUMMER", 10, 0).await?;
        ctx.coupons.expire_coupon("SUMMER".to_string()).await?;

        ctx.carts
            .add_item(ctx.user_uuid, NewCartItem::new(catalog.product))
            .await?;

        let result = ctx.carts.apply_coupon(ctx.user_uuid, "SUMMER".to_string()).await;

        assert!(
            matches!(result, Err(CartsServiceError::Coupon(CouponRejection::Expired))),
            "expected Expired, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn second_coupon_is_rejected_as_already_applied() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        create_coupon(&ctx, "FIRST", 10, 0).await?;
        create_coupon(&ctx, "SECOND", 20, 0).await?;

        ctx.carts
            .add_item(ctx.user_uuid, NewCartItem::new(catalog.product))
            .await?;

        ctx.carts.apply_coupon(ctx.user_uuid, "FIRST".to_string()).await?;

        let result = ctx.carts.apply_coupon(ctx.user_uuid, "SECOND".to_string()).await;

        assert!(
            matches!(result, Err(CartsServiceError::Coupon(CouponRejection::AlreadyApplied))),
            "expected AlreadyApplied, got {result:?}"
        );

        let cart = ctx.carts.remove_coupon(ctx.user_uuid).await?;

        assert!(cart.coupon.is_none());

        ctx.carts.apply_coupon(ctx.user_uuid, "SECOND".to_string()).await?;

        Ok(())
    }

    #[tokio::test]
    async fn coupon_expired_after_applying_stops_discounting() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        create_coupon(&ctx, "FLASH", 30, 0).await?;

        ctx.carts
            .add_item(ctx.user_uuid, NewCartItem::new(catalog.product))
            .await?;

        ctx.carts.apply_coupon(ctx.user_uuid, "FLASH".to_string()).await?;
        ctx.coupons.expire_coupon("FLASH".to_string()).await?;

        let cart = ctx.carts.current_cart(ctx.user_uuid).await?;

        assert_eq!(cart.coupon_code(), Some("FLASH"));
        assert_eq!(cart.total, 100);

        Ok(())
    }

    #[tokio::test]
    async fn checkout_snapshots_cart_and_marks_it_paid() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        create_coupon(&ctx, "TENOFF", 10, 100).await?;

        let cart = ctx
            .carts
            .add_item(
                ctx.user_uuid,
                NewCartItem::new(catalog.product)
                    .with_color(catalog.red)
                    .with_size(catalog.medium),
            )
            .await?;

        ctx.carts
            .update_quantity(ctx.user_uuid, cart.items[0].uuid, 2)
            .await?;

        ctx.carts.apply_coupon(ctx.user_uuid, "TENOFF".to_string()).await?;

        let order = ctx
            .carts
            .checkout(ctx.user_uuid, Some("pay_1".to_string()))
            .await?;

        assert_eq!(order.cart_uuid, cart.uuid);
        assert_eq!(order.coupon_code.as_deref(), Some("TENOFF"));
        assert_eq!(order.currency, "GBP");
        assert_eq!(order.subtotal, 260);
        assert_eq!(order.discount, 10);
        assert_eq!(order.grand_total, 250);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].position, 1);
        assert_eq!(order.items[0].total, 260);

        let paid = ctx.carts.get_cart(ctx.user_uuid, cart.uuid).await?;

        assert!(paid.is_paid);
        assert!(paid.paid_at.is_some());

        let fresh = ctx.carts.current_cart(ctx.user_uuid).await?;

        assert_ne!(fresh.uuid, cart.uuid);
        assert!(fresh.is_empty());

        // Later price changes do not alter the order.
        ctx.catalog.update_product_price(catalog.product, 999).await?;

        let stored = ctx.orders.get_order(ctx.user_uuid, order.uuid).await?;

        assert_eq!(stored.items[0].price, 100);
        assert_eq!(stored.grand_total, 250);

        Ok(())
    }

    /// Deletes the test product and lists a new one under the same name at 200.
    async fn relist_product(
        ctx: &TestContext,
        catalog: TestCatalog,
    ) -> Result<ProductUuid, CatalogServiceError> {
        ctx.catalog.delete_product(catalog.product).await?;

        let product = ctx
            .catalog
            .create_product(NewProduct {
                uuid: ProductUuid::new(),
                category_uuid: Some(catalog.category),
                name: "Test Product".to_string(),
                description: "Relisted".to_string(),
                price: 200,
                newest: true,
                colors: Vec::new(),
                sizes: Vec::new(),
            })
            .await?;

        Ok(product.uuid)
    }

    #[tokio::test]
    async fn relisted_product_with_same_name_is_priced_separately() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        ctx.carts
            .add_item(ctx.user_uuid, NewCartItem::new(catalog.product))
            .await?;

        let relisted = relist_product(&ctx, catalog).await?;

        let cart = ctx
            .carts
            .add_item(ctx.user_uuid, NewCartItem::new(relisted))
            .await?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items[0].line_total, 100);
        assert_eq!(cart.items[1].line_total, 200);
        assert_eq!(cart.subtotal, 300);
        assert_eq!(cart.total, 300);

        Ok(())
    }

    #[tokio::test]
    async fn checkout_item_totals_add_up_to_subtotal() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        ctx.carts
            .add_item(
                ctx.user_uuid,
                NewCartItem::new(catalog.product).with_size(catalog.large),
            )
            .await?;

        let relisted = relist_product(&ctx, catalog).await?;

        ctx.carts
            .add_item(ctx.user_uuid, NewCartItem::new(relisted))
            .await?;

        let order = ctx.carts.checkout(ctx.user_uuid, None).await?;

        assert_eq!(order.subtotal, 350);
        assert_eq!(order.grand_total, 350);

        let stored = ctx.orders.get_order(ctx.user_uuid, order.uuid).await?;
        let item_totals: u64 = stored.items.iter().map(|item| item.total).sum();

        assert_eq!(stored.items.len(), 2);
        assert_eq!(item_totals, stored.subtotal);
        assert_eq!(stored.items[0].size_price, 50);
        assert_eq!(stored.items[1].price, 200);

        Ok(())
    }

    #[tokio::test]
    async fn checkout_empty_cart_returns_empty_cart() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx.carts.checkout(ctx.user_uuid, None).await;

        assert!(
            matches!(result, Err(CartsServiceError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );

        ctx.carts.current_cart(ctx.user_uuid).await?;

        let result = ctx.carts.checkout(ctx.user_uuid, None).await;

        assert!(
            matches!(result, Err(CartsServiceError::EmptyCart)),
            "expected EmptyCart for a cart without items, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn paid_cart_cannot_be_changed() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        let cart = ctx
            .carts
            .add_item(ctx.user_uuid, NewCartItem::new(catalog.product))
            .await?;

        ctx.carts.checkout(ctx.user_uuid, None).await?;

        let result = ctx
            .carts
            .update_quantity(ctx.user_uuid, cart.items[0].uuid, 5)
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound for an item in a paid cart, got {result:?}"
        );

        let paid = ctx.carts.get_cart(ctx.user_uuid, cart.uuid).await?;

        assert!(matches!(
            paid.to_cart(rusty_money::iso::GBP)?.remove_coupon(),
            Err(CartError::AlreadyPaid)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn cart_not_visible_to_other_user() -> TestResult {
        let ctx = TestContext::new().await;
        let other = ctx.create_user("other").await?;

        let cart = ctx.carts.current_cart(ctx.user_uuid).await?;

        let result = ctx.carts.get_cart(other, cart.uuid).await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound for another user's cart, got {result:?}"
        );

        Ok(())
    }
}
