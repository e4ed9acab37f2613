//! Per-test databases inside one shared PostgreSQL container.

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};

pub(super) const SUPERUSER: &str = "storefront_test";
pub(super) const SUPERUSER_PASSWORD: &str = "storefront_test_password";

/// Database names are interpolated into DDL, so only plain identifiers are accepted.
fn validate_database_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > 63 {
        return Err("Database name must be 1-63 characters long".to_string());
    }

    if !name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        return Err("Database name must start with a letter or underscore".to_string());
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("Database name can only contain letters, digits and underscores".to_string());
    }

    Ok(())
}

async fn init_postgres_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(SUPERUSER)
        .with_password(SUPERUSER_PASSWORD)
        .with_db_name(SUPERUSER)
        .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
        .with_tag("17-alpine")
        .start()
        .await
        .expect("Failed to start PostgreSQL container")
}

static POSTGRES_CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

/// Names of databases waiting to be dropped.
static CLEANUP_SENDER: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

async fn init_cleanup_task() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(db_name) = receiver.recv().await {
            if let Err(err) = drop_database(&db_name).await {
                eprintln!("Failed to drop database '{db_name}': {err}");
            }
        }
    });

    sender
}

async fn server_url(database: &str) -> String {
    let container = POSTGRES_CONTAINER
        .get_or_init(init_postgres_container)
        .await;

    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get container port");

    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    format!("postgresql://{SUPERUSER}:{SUPERUSER_PASSWORD}@{host}:{port}/{database}")
}

async fn drop_database(db_name: &str) -> Result<(), sqlx::Error> {
    if POSTGRES_CONTAINER.get().is_none() || validate_database_name(db_name).is_err() {
        return Ok(());
    }

    let mut conn = PgConnection::connect(&server_url("postgres").await).await?;

    sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&mut conn)
        .await?;

    conn.close().await
}

/// A freshly migrated database, dropped in the background when the value goes out of scope.
///
/// Services commit their own transactions, so isolation comes from every test owning its own
/// database rather than from rolling back.
#[derive(Debug, Clone)]
pub struct TestDb {
    pub pool: PgPool,
    pub name: String,

    /// Superuser URL for `pool`, used to derive the application role's URL.
    pub(super) superuser_url: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = CLEANUP_SENDER.get() {
            let _ = sender.send(self.name.clone());
        }
    }
}

impl TestDb {
    pub async fn new() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();

        let thread_id = std::thread::current().id();

        let name = format!("storefront_test_{nanos}_{thread_id:?}")
            .replace([':', ' ', '(', ')'], "")
            .to_lowercase();

        Self::new_with_db_name(&name).await
    }

    pub async fn new_with_db_name(db_name: &str) -> Self {
        CLEANUP_SENDER.get_or_init(init_cleanup_task).await;

        if let Err(error) = validate_database_name(db_name) {
            panic!("Invalid database name '{db_name}': {error}");
        }

        let mut conn = PgConnection::connect(&server_url("postgres").await)
            .await
            .expect("Failed to connect to postgres database");

        sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
            .execute(&mut conn)
            .await
            .expect("Failed to create test database");

        conn.close()
            .await
            .expect("Failed to close admin connection");

        let database_url = server_url(db_name).await;

        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to create pool for database");

        crate::database::migrate(&pool)
            .await
            .expect("Failed to run migrations on database");

        Self {
            pool,
            name: db_name.to_string(),
            superuser_url: database_url,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_database_name_accepts_identifiers() {
        assert!(validate_database_name("valid_name").is_ok());
        assert!(validate_database_name("_underscore_start").is_ok());
        assert!(validate_database_name("storefront_test_123").is_ok());
    }

    #[test]
    fn validate_database_name_rejects_bad_names() {
        assert!(validate_database_name("").is_err());
        assert!(validate_database_name(&"a".repeat(64)).is_err());
        assert!(validate_database_name("123invalid").is_err());
        assert!(validate_database_name("invalid-hyphen").is_err());
        assert!(validate_database_name("invalid\"quote").is_err());
    }

    #[tokio::test]
    async fn new_database_is_migrated() {
        let test_db = TestDb::new().await;

        let tables: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM information_schema.tables WHERE table_name = 'shipping_addresses'",
        )
        .fetch_one(test_db.pool())
        .await
        .expect("Failed to query tables");

        assert_eq!(tables, 1);
    }
}
