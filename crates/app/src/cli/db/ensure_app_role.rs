use std::io::{self, Write};

use clap::Args;
use sqlx::{query, query_scalar};
use storefront_app::database;

use crate::cli::output_error;

#[derive(Debug, Args)]
pub(crate) struct EnsureAppRoleArgs {
    /// Administrative PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Role the storefront services connect as
    #[arg(long, default_value = "storefront_app")]
    role_name: String,

    /// Password for the storefront role
    #[arg(long, env = "APP_DB_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn run(args: EnsureAppRoleArgs) -> Result<(), String> {
    if args.role_name.trim().is_empty() {
        return Err("role name cannot be empty".to_string());
    }

    if args.password.trim().is_empty() {
        return Err("password cannot be empty".to_string());
    }

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|error| format!("failed to start transaction: {error}"))?;

    // Role names and passwords cannot be bound as parameters, so postgres quotes them for us.
    let role_ident: String = query_scalar("SELECT quote_ident($1)")
        .bind(&args.role_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|error| format!("failed to quote role name: {error}"))?;

    let password_lit: String = query_scalar("SELECT quote_literal($1)")
        .bind(&args.password)
        .fetch_one(&mut *tx)
        .await
        .map_err(|error| format!("failed to quote password: {error}"))?;

    let database_ident: String = query_scalar("SELECT quote_ident(current_database())")
        .fetch_one(&mut *tx)
        .await
        .map_err(|error| format!("failed to resolve database name: {error}"))?;

    let role_exists: bool =
        query_scalar("SELECT EXISTS (SELECT 1 FROM pg_roles WHERE rolname = $1)")
            .bind(&args.role_name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|error| format!("failed to look up role: {error}"))?;

    for sql in app_role_statements(&role_ident, &password_lit, role_exists, &database_ident) {
        query(&sql)
            .execute(&mut *tx)
            .await
            .map_err(|error| {
                format!("failed to apply `{}`: {error}", redact(&sql, &password_lit))
            })?;
    }

    tx.commit()
        .await
        .map_err(|error| format!("failed to commit changes: {error}"))?;

    let mut out = io::stdout();

    writeln!(out, "ensured app role: {}", args.role_name).map_err(output_error)?;
    writeln!(out, "row-level security applies to this role").map_err(output_error)?;

    Ok(())
}

/// Statements that create or update the runtime role and grant it table access.
///
/// The role never gets `SUPERUSER` or `BYPASSRLS`, so every policy on the user-scoped tables
/// applies to its connections.
fn app_role_statements(
    role_ident: &str,
    password_lit: &str,
    role_exists: bool,
    database_ident: &str,
) -> Vec<String> {
    let verb = if role_exists { "ALTER" } else { "CREATE" };

    vec![
        format!(
            "{verb} ROLE {role_ident} LOGIN PASSWORD {password_lit} NOSUPERUSER NOCREATEDB NOCREATEROLE NOREPLICATION NOBYPASSRLS"
        ),
        format!("GRANT CONNECT ON DATABASE {database_ident} TO {role_ident}"),
        format!("GRANT USAGE ON SCHEMA public TO {role_ident}"),
        format!(
            "GRANT SELECT, INSERT, UPDATE, DELETE ON ALL TABLES IN SCHEMA public TO {role_ident}"
        ),
        format!("GRANT USAGE, SELECT, UPDATE ON ALL SEQUENCES IN SCHEMA public TO {role_ident}"),
        format!(
            "ALTER DEFAULT PRIVILEGES IN SCHEMA public GRANT SELECT, INSERT, UPDATE, DELETE ON TABLES TO {role_ident}"
        ),
        format!(
            "ALTER DEFAULT PRIVILEGES IN SCHEMA public GRANT USAGE, SELECT, UPDATE ON SEQUENCES TO {role_ident}"
        ),
    ]
}

fn redact(sql: &str, password_lit: &str) -> String {
    sql.replace(password_lit, "'***'")
}
