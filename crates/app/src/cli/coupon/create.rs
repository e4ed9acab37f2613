use std::io::{self, Write};

use clap::Args;
use storefront_app::domain::coupons::{
    CouponsService, PgCouponsService, data::NewCoupon, records::CouponUuid,
};

use crate::cli::{ServiceArgs, output_error};

#[derive(Debug, Args)]
pub(crate) struct CreateCouponArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Code the shopper types in
    #[arg(long)]
    code: String,

    /// Amount taken off, in minor units
    #[arg(long)]
    discount: u64,

    /// Smallest subtotal the coupon applies to, in minor units
    #[arg(long, default_value_t = 0)]
    minimum: u64,
}

pub(crate) async fn run(args: CreateCouponArgs) -> Result<(), String> {
    let coupons = PgCouponsService::new(args.service.connect().await?);

    let coupon = NewCoupon {
        uuid: CouponUuid::new(),
        code: args.code,
        discount: args.discount,
        minimum: args.minimum,
        expired: false,
    };

    execute(&coupons, coupon, &mut io::stdout()).await
}

pub(crate) async fn execute(
    coupons: &dyn CouponsService,
    coupon: NewCoupon,
    out: &mut impl Write,
) -> Result<(), String> {
    if coupon.code.trim().is_empty() {
        return Err("code cannot be empty".to_string());
    }

    let coupon = coupons
        .create_coupon(coupon)
        .await
        .map_err(|error| format!("failed to create coupon: {error}"))?;

    writeln!(out, "coupon_uuid: {}", coupon.uuid).map_err(output_error)?;
    writeln!(out, "code: {}", coupon.code).map_err(output_error)?;
    writeln!(out, "discount: {}", coupon.discount).map_err(output_error)?;
    writeln!(out, "minimum: {}", coupon.minimum).map_err(output_error)?;

    Ok(())
}
