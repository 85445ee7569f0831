//! Account identity.

use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// An authenticated account.
///
/// Credentials never live on this type; the storefront keeps password hashes
/// in its user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
