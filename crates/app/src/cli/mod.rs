use std::io;

use clap::{Args, Parser, Subcommand};
use rusty_money::iso::{self, Currency};
use storefront_app::database::{self, Db};

mod catalog;
mod coupon;
mod db;
mod logging;
mod order;
mod user;

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) logging: logging::LoggingArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    User(user::UserCommand),
    Catalog(catalog::CatalogCommand),
    Coupon(coupon::CouponCommand),
    Order(order::OrderCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::User(command) => user::run(command).await,
            Commands::Catalog(command) => catalog::run(command).await,
            Commands::Coupon(command) => coupon::run(command).await,
            Commands::Order(command) => order::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}

/// Connection settings for commands that go through the services.
#[derive(Debug, Args)]
pub(crate) struct ServiceArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// ISO 4217 code of the currency prices are stored in
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "GBP", value_parser = parse_currency)]
    pub(crate) currency: &'static Currency,
}

impl ServiceArgs {
    pub(crate) async fn connect(&self) -> Result<Db, String> {
        let pool = database::connect(&self.database_url)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;

        Ok(Db::new(pool))
    }
}

fn parse_currency(code: &str) -> Result<&'static Currency, String> {
    iso::find(&code.trim().to_uppercase()).ok_or_else(|| format!("unknown currency code: {code}"))
}

pub(crate) fn output_error(error: io::Error) -> String {
    format!("failed to write output: {error}")
}
