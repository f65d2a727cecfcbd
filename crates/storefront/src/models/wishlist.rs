//! Wishlist domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mercato_core::ProductId;

use super::product::ProductSummary;

/// A product saved for later.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product: ProductSummary,
    pub added_at: DateTime<Utc>,
}

/// Outcome of toggling a wishlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WishlistToggle {
    Added,
    Removed,
}

impl WishlistToggle {
    /// Human-readable message for the response envelope.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Added => "Item added to wishlist",
            Self::Removed => "Item removed from wishlist",
        }
    }
}

/// Request body for toggling a wishlist entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToggleWishlistRequest {
    pub item: Option<ProductId>,
}
