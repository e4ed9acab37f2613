use clap::{Args, Subcommand};

mod seed;

#[derive(Debug, Args)]
pub(crate) struct CatalogCommand {
    #[command(subcommand)]
    command: CatalogSubcommand,
}

#[derive(Debug, Subcommand)]
enum CatalogSubcommand {
    Seed(seed::SeedCatalogArgs),
}

pub(crate) async fn run(command: CatalogCommand) -> Result<(), String> {
    match command.command {
        CatalogSubcommand::Seed(args) => seed::run(args).await,
    }
}
