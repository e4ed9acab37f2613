//! Test Helpers

use crate::{
    domain::catalog::{
        CatalogService, CatalogServiceError,
        data::{NewCategory, NewColorVariant, NewProduct, NewSizeVariant},
        records::{CategoryUuid, ColorVariantUuid, ProductUuid, SizeVariantUuid},
    },
    test::TestContext,
};

/// Identifiers of the catalog built by [`TestContext::create_catalog`].
///
/// "Test Product" costs 100 in the "Clothing" category. It comes in Red (+10) and Navy (+0),
/// and in S (+0), M (+20) and L (+50).
#[derive(Debug, Clone, Copy)]
pub(crate) struct TestCatalog {
    pub category: CategoryUuid,
    pub product: ProductUuid,
    pub red: ColorVariantUuid,
    pub navy: ColorVariantUuid,
    pub small: SizeVariantUuid,
    pub medium: SizeVariantUuid,
    pub large: SizeVariantUuid,
}

impl TestContext {
    pub(crate) async fn create_catalog(&self) -> Result<TestCatalog, CatalogServiceError> {
        let category = self
            .catalog
            .create_category(NewCategory {
                uuid: CategoryUuid::new(),
                name: "Clothing".to_string(),
            })
            .await?
            .uuid;

        let red = self.create_color("Red", 10).await?;
        let navy = self.create_color("Navy", 0).await?;
        let small = self.create_size("S", 0).await?;
        let medium = self.create_size("M", 20).await?;
        let large = self.create_size("L", 50).await?;

        let product = self
            .catalog
            .create_product(NewProduct {
                uuid: ProductUuid::new(),
                category_uuid: Some(category),
                name: "Test Product".to_string(),
                description: "A product for testing".to_string(),
                price: 100,
                newest: true,
                colors: vec![red, navy],
                sizes: vec![small, medium, large],
            })
            .await?
            .uuid;

        Ok(TestCatalog {
            category,
            product,
            red,
            navy,
            small,
            medium,
            large,
        })
    }

    async fn create_color(
        &self,
        name: &str,
        price: u64,
    ) -> Result<ColorVariantUuid, CatalogServiceError> {
        let variant = self
            .catalog
            .create_color_variant(NewColorVariant {
                uuid: ColorVariantUuid::new(),
                name: name.to_string(),
                price,
            })
            .await?;

        Ok(variant.uuid)
    }

    async fn create_size(
        &self,
        name: &str,
        price: u64,
    ) -> Result<SizeVariantUuid, CatalogServiceError> {
        let variant = self
            .catalog
            .create_size_variant(NewSizeVariant {
                uuid: SizeVariantUuid::new(),
                name: name.to_string(),
                price,
            })
            .await?;

        Ok(variant.uuid)
    }
}
