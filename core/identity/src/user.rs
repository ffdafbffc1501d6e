//! User and session records.

use serde::{Deserialize, Serialize};

use chainvault_common::UserId;
use chainvault_crypto::{PasswordHash, Salt};

/// Authorization role assigned at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// A registered user.
///
/// Salt and hash are replaced together on password change; every other
/// field is immutable after registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub hashed_password: PasswordHash,
    pub salt: Salt,
    pub role: Role,
}

/// An open session, keyed by its token in the session map.
///
/// Sessions carry no expiry; they live until logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
}
