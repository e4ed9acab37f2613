//! Addresses Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use storefront::addresses::ShippingAddress;

use crate::domain::{
    addresses::records::{AddressRecord, AddressUuid},
    users::records::UserUuid,
};

const CREATE_ADDRESS_SQL: &str = include_str!("sql/create_address.sql");
const CLEAR_CURRENT_ADDRESS_SQL: &str = include_str!("sql/clear_current_address.sql");
const PROMOTE_ADDRESS_SQL: &str = include_str!("sql/promote_address.sql");
const GET_CURRENT_ADDRESS_SQL: &str = include_str!("sql/get_current_address.sql");
const LIST_ADDRESSES_SQL: &str = include_str!("sql/list_addresses.sql");
const DELETE_ADDRESS_SQL: &str = include_str!("sql/delete_address.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgAddressesRepository;

impl PgAddressesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: AddressUuid,
        user: UserUuid,
        address: ShippingAddress,
    ) -> Result<AddressRecord, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(CREATE_ADDRESS_SQL)
            .bind(uuid.into_uuid())
            .bind(user.into_uuid())
            .bind(address.first_name)
            .bind(address.last_name)
            .bind(address.street)
            .bind(address.street_number)
            .bind(address.zip_code)
            .bind(address.city)
            .bind(address.country)
            .bind(address.phone)
            .bind(address.current_address)
            .fetch_one(&mut **tx)
            .await
    }

    /// Demotes the user's current address, if any.
    pub(crate) async fn clear_current(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_CURRENT_ADDRESS_SQL)
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn promote(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<AddressRecord, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(PROMOTE_ADDRESS_SQL)
            .bind(address.into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_current(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<AddressRecord>, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(GET_CURRENT_ADDRESS_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_addresses(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<AddressRecord>, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(LIST_ADDRESSES_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn delete_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_ADDRESS_SQL)
            .bind(address.into_uuid())
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for AddressRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: AddressUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            address: ShippingAddress {
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                street: row.try_get("street")?,
                street_number: row.try_get("street_number")?,
                zip_code: row.try_get("zip_code")?,
                city: row.try_get("city")?,
                country: row.try_get("country")?,
                phone: row.try_get("phone")?,
                current_address: row.try_get("current_address")?,
            },
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
