use std::io::{self, Write};

use clap::Args;
use storefront_app::domain::coupons::{CouponsService, PgCouponsService};

use crate::cli::{ServiceArgs, output_error};

#[derive(Debug, Args)]
pub(crate) struct ExpireCouponArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Code of the coupon to expire
    #[arg(long)]
    code: String,
}

pub(crate) async fn run(args: ExpireCouponArgs) -> Result<(), String> {
    let coupons = PgCouponsService::new(args.service.connect().await?);

    execute(&coupons, args.code, &mut io::stdout()).await
}

pub(crate) async fn execute(
    coupons: &dyn CouponsService,
    code: String,
    out: &mut impl Write,
) -> Result<(), String> {
    let coupon = coupons
        .expire_coupon(code)
        .await
        .map_err(|error| format!("failed to expire coupon: {error}"))?;

    writeln!(out, "expired coupon: {}", coupon.code).map_err(output_error)?;

    Ok(())
}
