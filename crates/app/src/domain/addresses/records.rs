//! Address Records

use jiff::Timestamp;
use storefront::addresses::ShippingAddress;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// Address UUID
pub type AddressUuid = TypedUuid<AddressRecord>;

/// Shipping Address Record
#[derive(Debug, Clone)]
pub struct AddressRecord {
    pub uuid: AddressUuid,
    pub user_uuid: UserUuid,
    pub address: ShippingAddress,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AddressRecord {
    /// Whether this is the user's current address.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.address.current_address
    }

    #[must_use]
    pub fn describe(&self, username: &str) -> String {
        self.address.describe(username)
    }
}
