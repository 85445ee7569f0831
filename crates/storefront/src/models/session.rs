//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};

use shopcart_core::{Role, User, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Role at login time.
    pub role: Role,
}

impl CurrentUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

impl From<CurrentUser> for User {
    fn from(user: CurrentUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for storing the session's cart key.
    pub const CART_ID: &str = "cart_id";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_round_trips_through_user() {
        let user = User {
            id: UserId::new(1),
            username: "admin".to_owned(),
            role: Role::Admin,
        };

        let current = CurrentUser::from(user.clone());

        assert!(current.is_admin());
        assert_eq!(User::from(current), user);
    }
}
