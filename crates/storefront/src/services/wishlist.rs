//! Wishlist service.

use sqlx::PgPool;
use tracing::instrument;

use crate::db;
use crate::error::{AppError, Entity};
use crate::models::wishlist::{ToggleWishlistRequest, WishlistItem, WishlistToggle};
use crate::models::{CurrentUser, require};

/// Saved-product operations for the calling shopper.
pub struct WishlistService {
    pool: PgPool,
}

impl WishlistService {
    /// Create a new wishlist service.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Save the product, or unsave it if it's already saved.
    ///
    /// # Errors
    ///
    /// Returns `MissingField("item")` without a product and
    /// `NotFound(Product)` when saving a product that doesn't exist.
    #[instrument(skip(self, user, request), fields(user_id = %user.id))]
    pub async fn toggle_item(
        &self,
        user: &CurrentUser,
        request: ToggleWishlistRequest,
    ) -> Result<WishlistToggle, AppError> {
        let item = require(request.item, "item")?;

        let mut tx = self.pool.begin().await?;
        if !db::users::lock(&mut *tx, user.id).await? {
            return Err(AppError::NotFound(Entity::User));
        }

        let outcome = if db::wishlist::remove(&mut *tx, user.id, item).await? {
            WishlistToggle::Removed
        } else {
            if db::products::get_by_id(&mut *tx, item).await?.is_none() {
                return Err(AppError::NotFound(Entity::Product));
            }
            db::wishlist::add(&mut *tx, user.id, item).await?;
            WishlistToggle::Added
        };
        tx.commit().await?;

        Ok(outcome)
    }

    /// The caller's saved products.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn get_wishlist(&self, user: &CurrentUser) -> Result<Vec<WishlistItem>, AppError> {
        Ok(db::wishlist::list(&self.pool, user.id).await?)
    }
}
