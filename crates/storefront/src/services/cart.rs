//! Cart service.
//!
//! The cart is keyed by product alone; see [`Cart::toggle`](crate::models::cart::Cart::toggle).

use sqlx::PgPool;
use tracing::{debug, instrument};

use mercato_core::ProductId;

use crate::db;
use crate::error::{AppError, Entity};
use crate::models::CurrentUser;
use crate::models::cart::{CartEntry, CartEntryPatch, CartLine, CartToggle, ToggleCartRequest};

/// Cart operations for the calling shopper.
pub struct CartService {
    pool: PgPool,
}

impl CartService {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add the product to the cart, or remove it if it's already there.
    ///
    /// # Errors
    ///
    /// Returns `MissingField`/`InvalidField` for a malformed request,
    /// `NotFound(Product)` when adding a product that doesn't exist, and
    /// `NotFound(User)` if the caller's account is gone.
    #[instrument(skip(self, user, request), fields(user_id = %user.id))]
    pub async fn toggle_item(
        &self,
        user: &CurrentUser,
        request: ToggleCartRequest,
    ) -> Result<CartToggle, AppError> {
        let entry = request.validate()?;
        let item = entry.item;

        let mut tx = self.pool.begin().await?;
        if !db::users::lock(&mut *tx, user.id).await? {
            return Err(AppError::NotFound(Entity::User));
        }

        let mut cart = db::cart::get(&mut *tx, user.id).await?;
        let outcome = cart.toggle(entry.clone());
        match outcome {
            CartToggle::Added => {
                if db::products::get_by_id(&mut *tx, item).await?.is_none() {
                    return Err(AppError::NotFound(Entity::Product));
                }
                db::cart::insert(&mut *tx, user.id, &entry).await?;
            }
            CartToggle::Removed => {
                db::cart::remove(&mut *tx, user.id, item).await?;
            }
        }
        tx.commit().await?;

        debug!(product_id = %item, ?outcome, cart_len = cart.len(), "Toggled cart item");
        Ok(outcome)
    }

    /// Merge a patch onto the cart entry for a product.
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` for a malformed patch and `NotFound(CartEntry)`
    /// if the product isn't in the cart.
    #[instrument(skip(self, user, patch), fields(user_id = %user.id, product_id = %product_id))]
    pub async fn update_entry(
        &self,
        user: &CurrentUser,
        product_id: ProductId,
        patch: CartEntryPatch,
    ) -> Result<CartEntry, AppError> {
        patch.validate()?;

        let mut tx = self.pool.begin().await?;
        if !db::users::lock(&mut *tx, user.id).await? {
            return Err(AppError::NotFound(Entity::User));
        }

        let mut cart = db::cart::get(&mut *tx, user.id).await?;
        let entry = cart
            .update(product_id, &patch)
            .cloned()
            .ok_or(AppError::NotFound(Entity::CartEntry))?;
        db::cart::save(&mut *tx, user.id, &entry).await?;
        tx.commit().await?;

        Ok(entry)
    }

    /// The caller's cart with product details joined in.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn get_cart(&self, user: &CurrentUser) -> Result<Vec<CartLine>, AppError> {
        Ok(db::cart::lines(&self.pool, user.id).await?)
    }
}
