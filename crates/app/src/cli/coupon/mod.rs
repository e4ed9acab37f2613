use clap::{Args, Subcommand};

mod create;
mod expire;

#[derive(Debug, Args)]
pub(crate) struct CouponCommand {
    #[command(subcommand)]
    command: CouponSubcommand,
}

#[derive(Debug, Subcommand)]
enum CouponSubcommand {
    Create(create::CreateCouponArgs),
    Expire(expire::ExpireCouponArgs),
}

pub(crate) async fn run(command: CouponCommand) -> Result<(), String> {
    match command.command {
        CouponSubcommand::Create(args) => create::run(args).await,
        CouponSubcommand::Expire(args) => expire::run(args).await,
    }
}
