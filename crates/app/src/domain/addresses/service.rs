//! Addresses service.
//!
//! A user has at most one current shipping address. Writers that can change which address is
//! current first lock the user's row, so they run one at a time per user, and demote the old
//! current address before promoting the new one. The partial unique index on
//! `shipping_addresses (user_uuid) WHERE current_address` backs this up in the schema.

use async_trait::async_trait;
use mockall::automock;
use storefront::addresses::AddressForm;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        addresses::{
            errors::AddressesServiceError,
            records::{AddressRecord, AddressUuid},
            repository::PgAddressesRepository,
        },
        users::{records::UserUuid, repository::PgUsersRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgAddressesService {
    db: Db,
    repository: PgAddressesRepository,
    users: PgUsersRepository,
}

impl PgAddressesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAddressesRepository::new(),
            users: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl AddressesService for PgAddressesService {
    #[tracing::instrument(
        name = "addresses.service.create_address",
        skip(self, form),
        fields(user_uuid = %user, current = form.save_address),
        err
    )]
    async fn create_address(
        &self,
        user: UserUuid,
        form: AddressForm,
    ) -> Result<AddressRecord, AddressesServiceError> {
        let address = form.validate()?;

        let mut tx = self.db.begin_user_transaction(user).await?;

        self.users.lock_user(&mut tx, user).await?;

        if address.current_address {
            self.repository.clear_current(&mut tx, user).await?;
        }

        let created = self
            .repository
            .create_address(&mut tx, AddressUuid::new(), user, address)
            .await?;

        tx.commit().await?;

        info!(address_uuid = %created.uuid, "created shipping address");

        Ok(created)
    }

    #[tracing::instrument(
        name = "addresses.service.set_current",
        skip(self),
        fields(user_uuid = %user, address_uuid = %address),
        err
    )]
    async fn set_current(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<AddressRecord, AddressesServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        self.users.lock_user(&mut tx, user).await?;

        let demoted = self.repository.clear_current(&mut tx, user).await?;

        let promoted = self.repository.promote(&mut tx, user, address).await?;

        tx.commit().await?;

        info!(demoted, "set current shipping address");

        Ok(promoted)
    }

    async fn current_address(
        &self,
        user: UserUuid,
    ) -> Result<Option<AddressRecord>, AddressesServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let current = self.repository.get_current(&mut tx, user).await?;

        tx.commit().await?;

        Ok(current)
    }

    async fn list_addresses(
        &self,
        user: UserUuid,
    ) -> Result<Vec<AddressRecord>, AddressesServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let addresses = self.repository.list_addresses(&mut tx, user).await?;

        tx.commit().await?;

        Ok(addresses)
    }

    #[tracing::instrument(
        name = "addresses.service.delete_address",
        skip(self),
        fields(user_uuid = %user, address_uuid = %address),
        err
    )]
    async fn delete_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<(), AddressesServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let rows_affected = self.repository.delete_address(&mut tx, user, address).await?;

        if rows_affected == 0 {
            return Err(AddressesServiceError::NotFound);
        }

        tx.commit().await?;

        info!("deleted shipping address");

        Ok(())
    }
}

#[automock]
#[async_trait]
/// Shipping addresses. At most one address per user is current.
pub trait AddressesService: Send + Sync {
    /// Validates and stores a new address. When the form asks to save it, it becomes the
    /// current address.
    async fn create_address(
        &self,
        user: UserUuid,
        form: AddressForm,
    ) -> Result<AddressRecord, AddressesServiceError>;

    /// Makes one of the user's addresses current, demoting the previous one.
    async fn set_current(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<AddressRecord, AddressesServiceError>;

    /// The user's current address, if one is set.
    async fn current_address(
        &self,
        user: UserUuid,
    ) -> Result<Option<AddressRecord>, AddressesServiceError>;

    /// All of the user's addresses, current first.
    async fn list_addresses(
        &self,
        user: UserUuid,
    ) -> Result<Vec<AddressRecord>, AddressesServiceError>;

    /// Deletes one of the user's addresses.
    async fn delete_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<(), AddressesServiceError>;
}
