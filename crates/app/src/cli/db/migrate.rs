use std::io::{self, Write};

use clap::Args;
use storefront_app::database;

use crate::cli::output_error;

#[derive(Debug, Args)]
pub(crate) struct MigrateArgs {
    /// Administrative PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: MigrateArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    database::migrate(&pool)
        .await
        .map_err(|error| format!("failed to run migrations: {error}"))?;

    writeln!(io::stdout(), "migrations applied").map_err(output_error)
}
