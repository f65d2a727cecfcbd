//! Status enums for marketplace entities.
//!
//! The wire strings (`pending`, `dispatched`, ...) are part of the public API
//! and match the `PostgreSQL` enum labels exactly.

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// `Cancelled` is terminal. Every other transition, including moving
/// backwards, is accepted by [`OrderStatus::transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Dispatched,
    Shipped,
    Delivered,
    Cancelled,
}

/// Error returned when an order cannot move to a new status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The order is cancelled and can no longer change.
    #[error("Order already cancelled")]
    AlreadyCancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Dispatched,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether no further transition is permitted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the dashboard counts this order as still open.
    ///
    /// `Dispatched` and `Shipped` are reported in the pending bucket
    /// together with `Pending`.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Dispatched | Self::Shipped)
    }

    /// Compute the status after a requested transition.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::AlreadyCancelled`] if the order is cancelled,
    /// whatever the requested target.
    pub const fn transition_to(self, next: Self) -> Result<Self, TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::AlreadyCancelled);
        }
        Ok(next)
    }

    /// The wire string for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Dispatched => "dispatched",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.user_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Shopper.
    #[default]
    Customer,
    /// Store administrator.
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Catalog visibility of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.product_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Listed and purchasable.
    #[default]
    Active,
    /// Hidden from the catalog.
    Inactive,
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("invalid product status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_rejects_every_target() {
        for target in OrderStatus::ALL {
            assert_eq!(
                OrderStatus::Cancelled.transition_to(target),
                Err(TransitionError::AlreadyCancelled)
            );
        }
    }

    #[test]
    fn test_non_terminal_accepts_every_target() {
        for from in OrderStatus::ALL.into_iter().filter(|s| !s.is_terminal()) {
            for to in OrderStatus::ALL {
                assert_eq!(from.transition_to(to), Ok(to));
            }
        }
    }

    #[test]
    fn test_backward_transition_is_permitted() {
        assert_eq!(
            OrderStatus::Delivered.transition_to(OrderStatus::Pending),
            Ok(OrderStatus::Pending)
        );
    }

    #[test]
    fn test_transition_error_message() {
        assert_eq!(
            TransitionError::AlreadyCancelled.to_string(),
            "Order already cancelled"
        );
    }

    #[test]
    fn test_open_bucket_groups_shipped_and_dispatched() {
        assert!(OrderStatus::Pending.is_open());
        assert!(OrderStatus::Dispatched.is_open());
        assert!(OrderStatus::Shipped.is_open());
        assert!(!OrderStatus::Delivered.is_open());
        assert!(!OrderStatus::Cancelled.is_open());
    }

    #[test]
    fn test_wire_strings_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
            assert_eq!(
                serde_json::to_string(&status).unwrap(),
                format!("\"{}\"", status.as_str())
            );
        }
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_user_role_parse() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!(UserRole::Customer.to_string(), "customer");
        assert!("super_admin".parse::<UserRole>().is_err());
    }
}
