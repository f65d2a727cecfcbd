//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mercato_core::{StoreId, UserId, UserRole};

/// A marketplace account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Account role.
    pub role: UserRole,
    /// Store owned by this user (store admins only).
    pub store_id: Option<StoreId>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

/// The customer details shown alongside an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}
