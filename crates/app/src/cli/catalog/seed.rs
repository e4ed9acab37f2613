use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::Args;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use storefront::{catalog::Variant, fixtures::Fixture};
use storefront_app::domain::{
    catalog::{
        CatalogService, PgCatalogService,
        data::{NewCategory, NewProduct, NewVariant},
        records::{CategoryUuid, ColorVariantUuid, ProductUuid, SizeVariantUuid},
    },
    coupons::{CouponsService, PgCouponsService, data::NewCoupon, records::CouponUuid},
};

use crate::cli::{ServiceArgs, output_error};

#[derive(Debug, Args)]
pub(crate) struct SeedCatalogArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// YAML fixture describing variants, products and coupons
    #[arg(long)]
    fixture: PathBuf,
}

pub(crate) async fn run(args: SeedCatalogArgs) -> Result<(), String> {
    let fixture = Fixture::from_path(&args.fixture)
        .map_err(|error| format!("failed to load fixture: {error}"))?;

    let db = args.service.connect().await?;

    execute(
        &PgCatalogService::new(db.clone(), args.service.currency),
        &PgCouponsService::new(db),
        &fixture,
        args.service.currency,
        &mut io::stdout(),
    )
    .await
}

/// Creates every category, variant, product and coupon in the fixture.
pub(crate) async fn execute(
    catalog: &dyn CatalogService,
    coupons: &dyn CouponsService,
    fixture: &Fixture,
    currency: &'static Currency,
    out: &mut impl Write,
) -> Result<(), String> {
    if fixture.currency() != currency {
        return Err(format!(
            "fixture is priced in {}, the store in {}",
            fixture.currency().iso_alpha_code,
            currency.iso_alpha_code
        ));
    }

    let mut categories: FxHashMap<String, CategoryUuid> = FxHashMap::default();

    for name in fixture.categories() {
        let category = catalog
            .create_category(NewCategory {
                uuid: CategoryUuid::new(),
                name: name.to_string(),
            })
            .await
            .map_err(|error| format!("failed to create category {name}: {error}"))?;

        categories.insert(name.to_string(), category.uuid);
    }

    let mut colors: FxHashMap<String, ColorVariantUuid> = FxHashMap::default();

    for color in fixture.colors() {
        let created = catalog
            .create_color_variant(new_variant(color)?)
            .await
            .map_err(|error| format!("failed to create colour {}: {error}", color.name()))?;

        colors.insert(created.name, created.uuid);
    }

    let mut sizes: FxHashMap<String, SizeVariantUuid> = FxHashMap::default();

    for size in fixture.sizes() {
        let created = catalog
            .create_size_variant(new_variant(size)?)
            .await
            .map_err(|error| format!("failed to create size {}: {error}", size.name()))?;

        sizes.insert(created.name, created.uuid);
    }

    let products = fixture.products();

    for entry in &products {
        let product = &entry.product;

        let new_product = NewProduct {
            uuid: ProductUuid::new(),
            category_uuid: entry
                .category
                .as_ref()
                .and_then(|name| categories.get(name).copied()),
            name: product.name().to_string(),
            description: entry.description.clone(),
            price: amount(product.price())?,
            newest: false,
            colors: product
                .colors()
                .iter()
                .map(|color| lookup(&colors, color.name()))
                .collect::<Result<_, _>>()?,
            sizes: product
                .sizes()
                .iter()
                .map(|size| lookup(&sizes, size.name()))
                .collect::<Result<_, _>>()?,
        };

        catalog
            .create_product(new_product)
            .await
            .map_err(|error| format!("failed to create product {}: {error}", product.name()))?;
    }

    let fixture_coupons = fixture.coupons();

    for coupon in &fixture_coupons {
        coupons
            .create_coupon(NewCoupon {
                uuid: CouponUuid::new(),
                code: coupon.code().to_string(),
                discount: amount(coupon.discount())?,
                minimum: amount(coupon.minimum())?,
                expired: coupon.is_expired(),
            })
            .await
            .map_err(|error| format!("failed to create coupon {}: {error}", coupon.code()))?;
    }

    writeln!(out, "categories: {}", categories.len()).map_err(output_error)?;
    writeln!(out, "colours: {}", colors.len()).map_err(output_error)?;
    writeln!(out, "sizes: {}", sizes.len()).map_err(output_error)?;
    writeln!(out, "products: {}", products.len()).map_err(output_error)?;
    writeln!(out, "coupons: {}", fixture_coupons.len()).map_err(output_error)?;

    Ok(())
}

fn new_variant<T: Default>(variant: &Variant<'_>) -> Result<NewVariant<T>, String> {
    Ok(NewVariant {
        uuid: T::default(),
        name: variant.name().to_string(),
        price: amount(variant.surcharge())?,
    })
}

fn amount(money: &Money<'_, Currency>) -> Result<u64, String> {
    u64::try_from(money.to_minor_units()).map_err(|_err| format!("negative amount: {money}"))
}

fn lookup<T: Copy>(uuids: &FxHashMap<String, T>, name: &str) -> Result<T, String> {
    uuids
        .get(name)
        .copied()
        .ok_or_else(|| format!("variant {name} is not defined in the fixture"))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::iso::{EUR, GBP};
    use storefront_app::domain::{
        catalog::{
            CatalogServiceError, MockCatalogService,
            records::{CategoryRecord, ColorVariantRecord, ProductRecord, SizeVariantRecord},
        },
        coupons::{MockCouponsService, records::CouponRecord},
    };
    use testresult::TestResult;

    use super::*;

    const FIXTURE: &str = r#"
currency: GBP

colors:
  red:
    name: Red
    price: "0.10 GBP"

sizes:
  s:
    name: S
    price: "0.00 GBP"
  m:
    name: M
    price: "0.20 GBP"

products:
  tee:
    name: Test Product
    price: "1.00 GBP"
    category: Clothing
    colors: [red]
    sizes: [s, m]

  mug:
    name: Enamel Mug
    price: "8.00 GBP"

coupons:
  retired:
    code: SUMMER
    discount: "5.00 GBP"
    minimum: "0.00 GBP"
    expired: true
"#;

    fn mock_catalog() -> MockCatalogService {
        let mut catalog = MockCatalogService::new();

        catalog.expect_create_category().times(1).returning(|category| {
            Ok(CategoryRecord {
                uuid: category.uuid,
                slug: category.name.to_lowercase(),
                name: category.name,
                created_at: Timestamp::now(),
                updated_at: Timestamp::now(),
            })
        });

        catalog.expect_create_color_variant().times(1).returning(|variant| {
            Ok(ColorVariantRecord {
                uuid: variant.uuid,
                name: variant.name,
                price: variant.price,
                created_at: Timestamp::now(),
                updated_at: Timestamp::now(),
            })
        });

        catalog.expect_create_size_variant().times(2).returning(|variant| {
            Ok(SizeVariantRecord {
                uuid: variant.uuid,
                name: variant.name,
                price: variant.price,
                created_at: Timestamp::now(),
                updated_at: Timestamp::now(),
            })
        });

        catalog
            .expect_create_product()
            .withf(|product| {
                product.name == "Test Product"
                    && product.price == 100
                    && product.category_uuid.is_some()
                    && product.colors.len() == 1
                    && product.sizes.len() == 2
            })
            .times(1)
            .returning(product_record);

        catalog
            .expect_create_product()
            .withf(|product| {
                product.name == "Enamel Mug"
                    && product.price == 800
                    && product.category_uuid.is_none()
            })
            .times(1)
            .returning(product_record);

        catalog
    }

    fn product_record(product: NewProduct) -> Result<ProductRecord, CatalogServiceError> {
        Ok(ProductRecord {
            uuid: product.uuid,
            category_uuid: product.category_uuid,
            slug: product.name.to_lowercase(),
            name: product.name,
            description: product.description,
            price: product.price,
            newest: product.newest,
            colors: Vec::new(),
            sizes: Vec::new(),
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
            deleted_at: None,
        })
    }

    #[tokio::test]
    async fn seeds_everything_in_fixture() -> TestResult {
        let fixture = Fixture::from_yaml(FIXTURE)?;
        let catalog = mock_catalog();

        let mut coupons = MockCouponsService::new();

        coupons
            .expect_create_coupon()
            .withf(|coupon| coupon.code == "SUMMER" && coupon.discount == 500 && coupon.expired)
            .times(1)
            .returning(|coupon| {
                Ok(CouponRecord {
                    uuid: coupon.uuid,
                    code: coupon.code,
                    discount: coupon.discount,
                    minimum: coupon.minimum,
                    expired: coupon.expired,
                    created_at: Timestamp::now(),
                    updated_at: Timestamp::now(),
                })
            });

        let mut out = Vec::new();

        execute(&catalog, &coupons, &fixture, GBP, &mut out).await?;

        let out = String::from_utf8(out)?;

        assert_eq!(
            out,
            "categories: 1\ncolours: 1\nsizes: 2\nproducts: 2\ncoupons: 1\n"
        );

        Ok(())
    }

    #[tokio::test]
    async fn currency_mismatch_is_rejected() -> TestResult {
        let fixture = Fixture::from_yaml(FIXTURE)?;
        let mut out = Vec::new();

        let result = execute(
            &MockCatalogService::new(),
            &MockCouponsService::new(),
            &fixture,
            EUR,
            &mut out,
        )
        .await;

        assert_eq!(
            result,
            Err("fixture is priced in GBP, the store in EUR".to_string())
        );

        Ok(())
    }
}
