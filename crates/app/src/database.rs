//! Database connection management

use sqlx::{PgPool, Postgres, Transaction, query, query_scalar};
use thiserror::Error;

use crate::domain::users::records::UserUuid;

/// SQL used to set the acting user for row-level security.
pub const SET_USER_CONTEXT_SQL: &str = "SELECT set_config('app.current_user_uuid', $1, true)";

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction without a user context, for shared tables (users, catalog, coupons,
    /// reviews).
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction fails.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Begin a transaction and set the acting user for RLS policies.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or setting the user context fails.
    pub async fn begin_user_transaction(
        &self,
        user: UserUuid,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        query(SET_USER_CONTEXT_SQL)
            .bind(user.into_uuid().to_string())
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Reports whether the connected role bypasses row-level security.
const ROLE_BYPASSES_RLS_SQL: &str =
    "SELECT rolsuper OR rolbypassrls FROM pg_roles WHERE rolname = current_user";

#[derive(Debug, Error)]
pub enum RoleCheckError {
    #[error("role `{0}` bypasses row-level security; connect as the application role")]
    BypassesRls(String),

    #[error("failed to inspect the connected role")]
    Sql(#[from] sqlx::Error),
}

/// Refuse to run as a role for which row-level security policies do not apply.
///
/// # Errors
///
/// Returns [`RoleCheckError::BypassesRls`] for superusers and `BYPASSRLS` roles.
pub async fn ensure_rls_enforced_role(pool: &PgPool) -> Result<(), RoleCheckError> {
    let bypasses: bool = query_scalar(ROLE_BYPASSES_RLS_SQL).fetch_one(pool).await?;

    if bypasses {
        let role: String = query_scalar("SELECT current_user::text").fetch_one(pool).await?;

        return Err(RoleCheckError::BypassesRls(role));
    }

    Ok(())
}
