//! Business logic services for the storefront.
//!
//! # Services
//!
//! - [`cart`] - Cart toggle, entry updates and the joined cart view
//! - [`wishlist`] - Saved products
//! - [`orders`] - Checkout, order status transitions and per-store order views
//! - [`inventory`] - Product catalog, admin updates, deletion and order ledger
//! - [`reviews`] - Reviews, store replies and average ratings
//! - [`dashboard`] - Store metrics recomputed on every request
//! - [`assets`] - External image host client
//!
//! Every operation takes the caller's [`CurrentUser`] explicitly. Operations
//! that write more than one row run in a single transaction and take row locks
//! on the records they mutate, so a failure leaves nothing half-applied and
//! concurrent requests on the same record are serialized.

pub mod assets;
pub mod cart;
pub mod dashboard;
pub mod inventory;
pub mod orders;
pub mod reviews;
pub mod wishlist;

use mercato_core::StoreId;

use crate::error::AppError;
use crate::models::CurrentUser;

/// The store a caller administers.
///
/// # Errors
///
/// Returns `AppError::AccessDenied` unless the caller is an admin with a store.
pub fn require_store_admin(user: &CurrentUser) -> Result<StoreId, AppError> {
    user.managed_store().ok_or(AppError::AccessDenied)
}

/// Check that a record owned by `owner` may be managed by the caller's store.
///
/// # Errors
///
/// Returns `AppError::AccessDenied` if the caller isn't that store's admin.
pub fn require_store_access(user: &CurrentUser, owner: StoreId) -> Result<StoreId, AppError> {
    let store = require_store_admin(user)?;
    if store != owner {
        return Err(AppError::AccessDenied);
    }
    Ok(store)
}
