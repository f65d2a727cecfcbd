//! Store domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mercato_core::{StoreId, UserId};

/// An independent seller on the marketplace.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// Unique store ID.
    pub id: StoreId,
    /// Store display name.
    pub name: String,
    /// Admin user who owns the store.
    pub owner_id: Option<UserId>,
    /// When the store was created.
    pub created_at: DateTime<Utc>,
}
