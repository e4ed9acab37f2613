//! Catalog service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rusty_money::iso::Currency;
use storefront::catalog::slugify;
use tracing::info;

use crate::{
    database::Db,
    domain::catalog::{
        data::{NewCategory, NewColorVariant, NewProduct, NewSizeVariant},
        errors::CatalogServiceError,
        records::{
            CategoryRecord, CategoryUuid, ColorVariantRecord, ProductRecord, ProductUuid,
            SizeVariantRecord,
        },
        repositories::{PgCategoriesRepository, PgProductsRepository, PgVariantsRepository},
    },
    money::to_amount,
};

/// How many related products a product page shows.
pub const RELATED_PRODUCTS_LIMIT: i64 = 4;

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    currency: &'static Currency,
    categories: PgCategoriesRepository,
    products: PgProductsRepository,
    variants: PgVariantsRepository,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db, currency: &'static Currency) -> Self {
        Self {
            db,
            currency,
            categories: PgCategoriesRepository::new(),
            products: PgProductsRepository::new(),
            variants: PgVariantsRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogService for PgCatalogService {
    #[tracing::instrument(
        name = "catalog.service.create_category",
        skip(self, category),
        fields(category_uuid = %category.uuid),
        err
    )]
    async fn create_category(
        &self,
        category: NewCategory,
    ) -> Result<CategoryRecord, CatalogServiceError> {
        let slug = slugify(&category.name);

        if slug.is_empty() {
            return Err(CatalogServiceError::InvalidData);
        }

        let mut tx = self.db.begin().await?;

        let created = self
            .categories
            .create_category(&mut tx, category, &slug)
            .await?;

        tx.commit().await?;

        info!(slug = %created.slug, "created category");

        Ok(created)
    }

    async fn get_category_by_slug(
        &self,
        slug: String,
    ) -> Result<CategoryRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let category = self.categories.get_category_by_slug(&mut tx, &slug).await?;

        tx.commit().await?;

        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let categories = self.categories.list_categories(&mut tx).await?;

        tx.commit().await?;

        Ok(categories)
    }

    #[tracing::instrument(
        name = "catalog.service.create_color_variant",
        skip(self, variant),
        fields(variant_uuid = %variant.uuid),
        err
    )]
    async fn create_color_variant(
        &self,
        variant: NewColorVariant,
    ) -> Result<ColorVariantRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.variants.create_color_variant(&mut tx, variant).await?;

        tx.commit().await?;

        info!(name = %created.name, "created color variant");

        Ok(created)
    }

    #[tracing::instrument(
        name = "catalog.service.create_size_variant",
        skip(self, variant),
        fields(variant_uuid = %variant.uuid),
        err
    )]
    async fn create_size_variant(
        &self,
        variant: NewSizeVariant,
    ) -> Result<SizeVariantRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.variants.create_size_variant(&mut tx, variant).await?;

        tx.commit().await?;

        info!(name = %created.name, "created size variant");

        Ok(created)
    }

    #[tracing::instrument(
        name = "catalog.service.create_product",
        skip(self, product),
        fields(product_uuid = %product.uuid),
        err
    )]
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, CatalogServiceError> {
        let slug = slugify(&product.name);

        if slug.is_empty() {
            return Err(CatalogServiceError::InvalidData);
        }

        let mut tx = self.db.begin().await?;

        let mut created = self.products.create_product(&mut tx, &product, &slug).await?;

        for color in &product.colors {
            self.variants.attach_color(&mut tx, created.uuid, *color).await?;
        }

        for size in &product.sizes {
            self.variants.attach_size(&mut tx, created.uuid, *size).await?;
        }

        self.variants
            .attach_variants(&mut tx, std::slice::from_mut(&mut created))
            .await?;

        tx.commit().await?;

        info!(slug = %created.slug, "created product");

        Ok(created)
    }

    async fn get_product(
        &self,
        product: ProductUuid,
        point_in_time: Timestamp,
    ) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let mut product = self
            .products
            .get_product(&mut tx, product, point_in_time)
            .await?;

        self.variants
            .attach_variants(&mut tx, std::slice::from_mut(&mut product))
            .await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn get_product_by_slug(
        &self,
        slug: String,
        point_in_time: Timestamp,
    ) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let mut product = self
            .products
            .get_product_by_slug(&mut tx, &slug, point_in_time)
            .await?;

        self.variants
            .attach_variants(&mut tx, std::slice::from_mut(&mut product))
            .await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn list_products(
        &self,
        category: Option<CategoryUuid>,
        point_in_time: Timestamp,
    ) -> Result<Vec<ProductRecord>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let mut products = self
            .products
            .list_products(&mut tx, category, point_in_time)
            .await?;

        self.variants.attach_variants(&mut tx, &mut products).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn related_products(
        &self,
        product: ProductUuid,
        point_in_time: Timestamp,
    ) -> Result<Vec<ProductRecord>, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        // Confirms the product itself is visible.
        self.products
            .get_product(&mut tx, product, point_in_time)
            .await?;

        let mut related = self
            .products
            .related_products(&mut tx, product, point_in_time, RELATED_PRODUCTS_LIMIT)
            .await?;

        self.variants.attach_variants(&mut tx, &mut related).await?;

        tx.commit().await?;

        Ok(related)
    }

    #[tracing::instrument(
        name = "catalog.service.update_product_price",
        skip(self),
        fields(product_uuid = %product),
        err
    )]
    async fn update_product_price(
        &self,
        product: ProductUuid,
        price: u64,
    ) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let mut updated = self
            .products
            .update_product_price(&mut tx, product, price)
            .await?;

        self.variants
            .attach_variants(&mut tx, std::slice::from_mut(&mut updated))
            .await?;

        tx.commit().await?;

        info!(price, "updated product price");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "catalog.service.delete_product",
        skip(self),
        fields(product_uuid = %product),
        err
    )]
    async fn delete_product(&self, product: ProductUuid) -> Result<(), CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.products.delete_product(&mut tx, product).await?;

        if rows_affected == 0 {
            return Err(CatalogServiceError::NotFound);
        }

        tx.commit().await?;

        info!("deleted product");

        Ok(())
    }

    async fn price_by_size(
        &self,
        product: ProductUuid,
        size: String,
        point_in_time: Timestamp,
    ) -> Result<u64, CatalogServiceError> {
        let product = self.get_product(product, point_in_time).await?;

        let price = product.to_product(self.currency)?.price_by_size(&size)?;

        Ok(to_amount(&price)?)
    }
}

#[automock]
#[async_trait]
/// Product catalog operations.
pub trait CatalogService: Send + Sync {
    /// Creates a category; its slug is derived from the name.
    async fn create_category(
        &self,
        category: NewCategory,
    ) -> Result<CategoryRecord, CatalogServiceError>;

    /// Retrieve a category by slug.
    async fn get_category_by_slug(
        &self,
        slug: String,
    ) -> Result<CategoryRecord, CatalogServiceError>;

    /// All categories, by name.
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, CatalogServiceError>;

    /// Creates a colour option.
    async fn create_color_variant(
        &self,
        variant: NewColorVariant,
    ) -> Result<ColorVariantRecord, CatalogServiceError>;

    /// Creates a size option.
    async fn create_size_variant(
        &self,
        variant: NewSizeVariant,
    ) -> Result<SizeVariantRecord, CatalogServiceError>;

    /// Creates a product and attaches its variants.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, CatalogServiceError>;

    /// Retrieve a single product as it was at `point_in_time`.
    async fn get_product(
        &self,
        product: ProductUuid,
        point_in_time: Timestamp,
    ) -> Result<ProductRecord, CatalogServiceError>;

    /// Retrieve a single product by slug as it was at `point_in_time`.
    async fn get_product_by_slug(
        &self,
        slug: String,
        point_in_time: Timestamp,
    ) -> Result<ProductRecord, CatalogServiceError>;

    /// Products visible at `point_in_time`, optionally limited to one category.
    async fn list_products(
        &self,
        category: Option<CategoryUuid>,
        point_in_time: Timestamp,
    ) -> Result<Vec<ProductRecord>, CatalogServiceError>;

    /// Other products in the same category.
    async fn related_products(
        &self,
        product: ProductUuid,
        point_in_time: Timestamp,
    ) -> Result<Vec<ProductRecord>, CatalogServiceError>;

    /// Changes a product's base price.
    async fn update_product_price(
        &self,
        product: ProductUuid,
        price: u64,
    ) -> Result<ProductRecord, CatalogServiceError>;

    /// Soft-deletes a product.
    async fn delete_product(&self, product: ProductUuid) -> Result<(), CatalogServiceError>;

    /// Unit price of a product in the named size.
    async fn price_by_size(
        &self,
        product: ProductUuid,
        size: String,
        point_in_time: Timestamp,
    ) -> Result<u64, CatalogServiceError>;
}
