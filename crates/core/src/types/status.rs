//! Roles and order statuses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account role used by the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May manage products and order statuses.
    Admin,
    /// Regular shopper.
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Longest status label accepted from an administrator.
pub const MAX_STATUS_LENGTH: usize = 32;

/// Lifecycle status of an order.
///
/// Every order starts as [`OrderStatus::PENDING`]. Administrators move it to
/// other labels; which labels are accepted is decided by [`StatusPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderStatus(String);

impl OrderStatus {
    pub const PENDING: &'static str = "PENDING";
    pub const SHIPPED: &'static str = "SHIPPED";
    pub const DELIVERED: &'static str = "DELIVERED";
    pub const CANCELLED: &'static str = "CANCELLED";

    /// Labels accepted under [`StatusPolicy::Strict`], in display order.
    pub const KNOWN: [&'static str; 4] = [
        Self::PENDING,
        Self::SHIPPED,
        Self::DELIVERED,
        Self::CANCELLED,
    ];

    /// Initial status of every new order.
    #[must_use]
    pub fn pending() -> Self {
        Self(Self::PENDING.to_owned())
    }

    /// Rehydrate a status that was already accepted and stored.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.0 == Self::PENDING
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejected status input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("status must not be empty")]
    Empty,
    #[error("status must be at most {MAX_STATUS_LENGTH} characters")]
    TooLong,
    #[error("unknown status: {0}")]
    Unknown(String),
}

/// Which status labels an administrator may set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Any non-empty label up to [`MAX_STATUS_LENGTH`] characters.
    #[default]
    Open,
    /// Only the labels in [`OrderStatus::KNOWN`] (case-insensitive).
    Strict,
}

impl StatusPolicy {
    /// Validate an administrator-supplied status label.
    ///
    /// Surrounding whitespace is trimmed. Under the strict policy the label is
    /// normalized to its canonical upper-case spelling.
    ///
    /// # Errors
    ///
    /// Returns `StatusError` if the label is empty, too long, or (strict policy
    /// only) not one of the known labels.
    pub fn parse(self, raw: &str) -> Result<OrderStatus, StatusError> {
        let label = raw.trim();
        if label.is_empty() {
            return Err(StatusError::Empty);
        }
        if label.chars().count() > MAX_STATUS_LENGTH {
            return Err(StatusError::TooLong);
        }

        match self {
            Self::Open => Ok(OrderStatus(label.to_owned())),
            Self::Strict => OrderStatus::KNOWN
                .iter()
                .find(|known| known.eq_ignore_ascii_case(label))
                .map(|known| OrderStatus((*known).to_owned()))
                .ok_or_else(|| StatusError::Unknown(label.to_owned())),
        }
    }

    /// Labels to offer in the admin status picker.
    #[must_use]
    pub const fn suggestions(self) -> &'static [&'static str] {
        &OrderStatus::KNOWN
    }
}

impl std::fmt::Display for StatusPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

impl std::str::FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "strict" => Ok(Self::Strict),
            _ => Err(format!("invalid status policy: {s} (expected open or strict)")),
        }
    }
}
