//! User Data

use crate::domain::users::records::UserUuid;

/// New User Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// UUID to assign to the user row.
    pub uuid: UserUuid,

    /// Login name, unique ignoring case.
    pub username: String,

    /// Contact email address.
    pub email: String,
}
