//! Wishlists service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rusty_money::iso::Currency;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{CartsService, PgCartsService, data::NewCartItem, records::CartRecord},
        catalog::{
            records::{ProductUuid, SizeVariantUuid},
            repositories::{PgProductsRepository, PgVariantsRepository},
        },
        users::records::UserUuid,
        wishlists::{
            errors::WishlistsServiceError, records::WishlistEntryRecord,
            repository::PgWishlistsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgWishlistsService {
    db: Db,
    repository: PgWishlistsRepository,
    products: PgProductsRepository,
    variants: PgVariantsRepository,
    carts: PgCartsService,
}

impl PgWishlistsService {
    #[must_use]
    pub fn new(db: Db, currency: &'static Currency) -> Self {
        Self {
            carts: PgCartsService::new(db.clone(), currency),
            db,
            repository: PgWishlistsRepository::new(),
            products: PgProductsRepository::new(),
            variants: PgVariantsRepository::new(),
        }
    }
}

#[async_trait]
impl WishlistsService for PgWishlistsService {
    #[tracing::instrument(
        name = "wishlists.service.add",
        skip(self),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn add(
        &self,
        user: UserUuid,
        product: ProductUuid,
        size: Option<SizeVariantUuid>,
    ) -> Result<WishlistEntryRecord, WishlistsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let mut record = self.products.get_product(&mut tx, product, Timestamp::now()).await?;

        self.variants
            .attach_variants(&mut tx, std::slice::from_mut(&mut record))
            .await?;

        if size.is_some_and(|size| record.size(size).is_none()) {
            return Err(WishlistsServiceError::UnavailableVariant);
        }

        let entry = self.repository.add_entry(&mut tx, user, product, size).await?;

        tx.commit().await?;

        info!(entry_uuid = %entry.uuid, "added product to wishlist");

        Ok(entry)
    }

    #[tracing::instrument(
        name = "wishlists.service.remove",
        skip(self),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn remove(
        &self,
        user: UserUuid,
        product: ProductUuid,
        size: Option<SizeVariantUuid>,
    ) -> Result<(), WishlistsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let rows_affected = self.repository.remove_entry(&mut tx, user, product, size).await?;

        if rows_affected == 0 {
            return Err(WishlistsServiceError::NotFound);
        }

        tx.commit().await?;

        info!("removed product from wishlist");

        Ok(())
    }

    async fn list(
        &self,
        user: UserUuid,
    ) -> Result<Vec<WishlistEntryRecord>, WishlistsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let entries = self.repository.list_entries(&mut tx, user).await?;

        tx.commit().await?;

        Ok(entries)
    }

    #[tracing::instrument(
        name = "wishlists.service.move_to_cart",
        skip(self),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn move_to_cart(
        &self,
        user: UserUuid,
        product: ProductUuid,
        size: Option<SizeVariantUuid>,
    ) -> Result<CartRecord, WishlistsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let rows_affected = self.repository.remove_entry(&mut tx, user, product, size).await?;

        if rows_affected == 0 {
            return Err(WishlistsServiceError::NotFound);
        }

        let mut item = NewCartItem::new(product);
        item.size_uuid = size;

        let cart = self.carts.add_item_in(&mut tx, user, item).await?;

        tx.commit().await?;

        info!(cart_uuid = %cart, "moved wishlist product to cart");

        Ok(self.carts.get_cart(user, cart).await?)
    }
}

#[automock]
#[async_trait]
/// Wishlist operations. An entry is a product, optionally in a chosen size.
pub trait WishlistsService: Send + Sync {
    /// Adds a product to the user's wishlist. Adding the same product and size twice fails with
    /// `AlreadyExists`.
    async fn add(
        &self,
        user: UserUuid,
        product: ProductUuid,
        size: Option<SizeVariantUuid>,
    ) -> Result<WishlistEntryRecord, WishlistsServiceError>;

    /// Removes an entry from the user's wishlist.
    async fn remove(
        &self,
        user: UserUuid,
        product: ProductUuid,
        size: Option<SizeVariantUuid>,
    ) -> Result<(), WishlistsServiceError>;

    /// The user's wishlist, newest first.
    async fn list(&self, user: UserUuid) -> Result<Vec<WishlistEntryRecord>, WishlistsServiceError>;

    /// Moves an entry into the unpaid cart.
    async fn move_to_cart(
        &self,
        user: UserUuid,
        product: ProductUuid,
        size: Option<SizeVariantUuid>,
    ) -> Result<CartRecord, WishlistsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn add_returns_entry() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        let entry = ctx
            .wishlists
            .add(ctx.user_uuid, catalog.product, Some(catalog.medium))
            .await?;

        assert_eq!(entry.product_uuid, catalog.product);
        assert_eq!(entry.product_name, "Test Product");
        assert_eq!(entry.price, 100);
        assert_eq!(entry.size_uuid, Some(catalog.medium));
        assert_eq!(entry.size_name.as_deref(), Some("M"));

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_entry_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        ctx.wishlists
            .add(ctx.user_uuid, catalog.product, Some(catalog.medium))
            .await?;

        let result = ctx
            .wishlists
            .add(ctx.user_uuid, catalog.product, Some(catalog.medium))
            .await;

        assert!(
            matches!(result, Err(WishlistsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        assert_eq!(ctx.wishlists.list(ctx.user_uuid).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_entry_without_size_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        ctx.wishlists.add(ctx.user_uuid, catalog.product, None).await?;

        let result = ctx.wishlists.add(ctx.user_uuid, catalog.product, None).await;

        assert!(
            matches!(result, Err(WishlistsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn same_product_in_other_size_is_separate_entry() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        ctx.wishlists
            .add(ctx.user_uuid, catalog.product, Some(catalog.small))
            .await?;

        ctx.wishlists
            .add(ctx.user_uuid, catalog.product, Some(catalog.large))
            .await?;

        assert_eq!(ctx.wishlists.list(ctx.user_uuid).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn unoffered_size_returns_unavailable_variant() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        let result = ctx
            .wishlists
            .add(ctx.user_uuid, catalog.product, Some(SizeVariantUuid::new()))
            .await;

        assert!(
            matches!(result, Err(WishlistsServiceError::UnavailableVariant)),
            "expected UnavailableVariant, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn remove_deletes_entry() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        ctx.wishlists.add(ctx.user_uuid, catalog.product, None).await?;
        ctx.wishlists.remove(ctx.user_uuid, catalog.product, None).await?;

        assert!(ctx.wishlists.list(ctx.user_uuid).await?.is_empty());

        let result = ctx.wishlists.remove(ctx.user_uuid, catalog.product, None).await;

        assert!(
            matches!(result, Err(WishlistsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn move_to_cart_adds_line_and_removes_entry() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        ctx.wishlists
            .add(ctx.user_uuid, catalog.product, Some(catalog.medium))
            .await?;

        let cart = ctx
            .wishlists
            .move_to_cart(ctx.user_uuid, catalog.product, Some(catalog.medium))
            .await?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items[0].quantity, 1);
        assert_eq!(cart.items[0].line_total, 120);

        assert!(ctx.wishlists.list(ctx.user_uuid).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn move_to_cart_increments_existing_line() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        ctx.carts
            .add_item(ctx.user_uuid, NewCartItem::new(catalog.product))
            .await?;

        ctx.wishlists.add(ctx.user_uuid, catalog.product, None).await?;

        let cart = ctx
            .wishlists
            .move_to_cart(ctx.user_uuid, catalog.product, None)
            .await?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);

        Ok(())
    }

    #[tokio::test]
    async fn move_missing_entry_leaves_cart_unchanged() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;

        let result = ctx
            .wishlists
            .move_to_cart(ctx.user_uuid, catalog.product, None)
            .await;

        assert!(
            matches!(result, Err(WishlistsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        assert_eq!(ctx.carts.cart_count(ctx.user_uuid).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn wishlist_not_visible_to_other_user() -> TestResult {
        let ctx = TestContext::new().await;
        let catalog = ctx.create_catalog().await?;
        let other = ctx.create_user("other").await?;

        ctx.wishlists.add(ctx.user_uuid, catalog.product, None).await?;

        assert!(ctx.wishlists.list(other).await?.is_empty());

        let result = ctx.wishlists.remove(other, catalog.product, None).await;

        assert!(
            matches!(result, Err(WishlistsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }
}
