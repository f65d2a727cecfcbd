//! Domain models for the storefront.
//!
//! These types are validated domain objects, separate from database row types.
//! The pure lifecycle rules live here so they can be tested without a database:
//!
//! - [`cart`] - toggle-by-product cart semantics and entry patches
//! - [`order`] - checkout validation, inventory checks, per-store order views
//! - [`product`] - catalog entries and the admin patch rules
//! - [`review`] - review inputs
//! - [`dashboard`] - store metrics computed from live orders and products
//! - [`wishlist`] - saved products

pub mod cart;
pub mod dashboard;
pub mod order;
pub mod product;
pub mod review;
pub mod session;
pub mod store;
pub mod user;
pub mod wishlist;

pub use session::{CurrentUser, keys as session_keys};

/// Boundary validation failure for a request payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was absent or blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    /// A field was present but malformed.
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

impl ValidationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Unwrap a required field.
pub(crate) fn require<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField(field))
}

/// Unwrap a required text field, treating blank strings as absent.
pub(crate) fn require_text(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}
