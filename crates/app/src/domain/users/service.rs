//! Users service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::users::{
        data::NewUser,
        errors::UsersServiceError,
        records::{UserRecord, UserUuid},
        repository::PgUsersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgUsersService {
    db: Db,
    repository: PgUsersRepository,
}

impl PgUsersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    #[tracing::instrument(
        name = "users.service.create_user",
        skip(self, user),
        fields(user_uuid = %user.uuid),
        err
    )]
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_user(&mut tx, user).await?;

        tx.commit().await?;

        info!(user_uuid = %created.uuid, "created user");

        Ok(created)
    }

    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let user = self.repository.get_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(user)
    }

    #[tracing::instrument(
        name = "users.service.delete_user",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn delete_user(&self, user: UserUuid) -> Result<(), UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_user(&mut tx, user).await?;

        if rows_affected == 0 {
            return Err(UsersServiceError::NotFound);
        }

        tx.commit().await?;

        info!("deleted user");

        Ok(())
    }
}

#[automock]
#[async_trait]
/// User account operations.
pub trait UsersService: Send + Sync {
    /// Creates a new user.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError>;

    /// Retrieve a single active user.
    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError>;

    /// Soft-deletes a user.
    async fn delete_user(&self, user: UserUuid) -> Result<(), UsersServiceError>;
}
