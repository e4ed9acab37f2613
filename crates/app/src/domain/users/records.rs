//! User Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// User Record
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Unique user identifier.
    pub uuid: UserUuid,

    /// Login name.
    pub username: String,

    /// Contact email address.
    pub email: String,

    /// Creation timestamp.
    pub created_at: Timestamp,

    /// Last update timestamp.
    pub updated_at: Timestamp,

    /// Soft-delete timestamp when deleted.
    pub deleted_at: Option<Timestamp>,
}
