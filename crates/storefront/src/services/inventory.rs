//! Inventory service: the product catalog and its admin operations.

use sqlx::PgPool;
use tracing::{info, instrument};

use mercato_core::{ProductId, StoreId};

use crate::db;
use crate::error::{AppError, Entity};
use crate::models::CurrentUser;
use crate::models::product::{
    CreateProductRequest, Product, ProductOrderRef, UpdateProductRequest,
};
use crate::services::assets::{AssetClient, AssetError};
use crate::services::{require_store_access, require_store_admin};

/// Catalog reads and store-admin product management.
pub struct InventoryService {
    pool: PgPool,
    assets: Option<AssetClient>,
}

impl InventoryService {
    /// Create a new inventory service.
    ///
    /// Without an asset client, products that still have images cannot be
    /// deleted.
    #[must_use]
    pub const fn new(pool: PgPool, assets: Option<AssetClient>) -> Self {
        Self { pool, assets }
    }

    /// Get a product with its counters and rating.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Product)` if it doesn't exist.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, AppError> {
        db::products::get_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound(Entity::Product))
    }

    /// List a store's products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Store)` if the store doesn't exist.
    #[instrument(skip(self))]
    pub async fn list_store_products(&self, store_id: StoreId) -> Result<Vec<Product>, AppError> {
        if db::stores::get_by_id(&self.pool, store_id).await?.is_none() {
            return Err(AppError::NotFound(Entity::Store));
        }
        Ok(db::products::list_by_store(&self.pool, store_id).await?)
    }

    /// Add a product to the caller's store. It starts with nothing sold and
    /// no rating.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` unless the caller administers a store, and
    /// `MissingField`/`InvalidField` for a malformed request.
    #[instrument(skip(self, user, request))]
    pub async fn create_product(
        &self,
        user: &CurrentUser,
        request: CreateProductRequest,
    ) -> Result<Product, AppError> {
        let store = require_store_admin(user)?;
        let input = request.validate()?;

        let product = db::products::insert(&self.pool, store, &input).await?;
        info!(product_id = %product.id, store_id = %store, "Product created");
        Ok(product)
    }

    /// Apply an admin update to one of the caller's products.
    ///
    /// Empty values leave fields unchanged; a stock of `0` is ignored.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Product)`, `AccessDenied` for another store's
    /// product, or `InvalidField` for a malformed value.
    #[instrument(skip(self, user, request), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        user: &CurrentUser,
        id: ProductId,
        request: UpdateProductRequest,
    ) -> Result<Product, AppError> {
        let patch = request.validate()?;

        let mut tx = self.pool.begin().await?;
        let mut product = db::products::lock(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound(Entity::Product))?;
        require_store_access(user, product.store_id)?;

        if patch.is_empty() {
            return Ok(product);
        }
        patch.apply(&mut product);
        let saved = db::products::save(&mut *tx, &product).await?;
        tx.commit().await?;

        Ok(saved)
    }

    /// Delete one of the caller's products together with its hosted images.
    ///
    /// A product that appears in any order is kept, since the order ledger
    /// refers to it. Every image must be removed from the asset host before
    /// the product row is deleted; if any removal fails the product stays.
    ///
    /// The asset host is called outside any transaction so no row lock is
    /// held across HTTP requests. The row is then locked and the order check
    /// repeated before deleting.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Product)`, `AccessDenied`, `Conflict` for an ordered
    /// product, or `Asset` if an image could not be removed.
    #[instrument(skip(self, user), fields(product_id = %id))]
    pub async fn delete_product(&self, user: &CurrentUser, id: ProductId) -> Result<(), AppError> {
        let product = self.get_product(id).await?;
        require_store_access(user, product.store_id)?;
        ensure_unordered(db::products::line_count(&self.pool, id).await?)?;

        if !product.images.is_empty() {
            let assets = self.assets.as_ref().ok_or(AssetError::NotConfigured)?;
            assets.delete_images(&product.images).await?;
        }

        let mut tx = self.pool.begin().await?;
        db::products::lock(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound(Entity::Product))?;
        ensure_unordered(db::products::line_count(&mut *tx, id).await?)?;

        db::products::delete(&mut *tx, id).await?;
        tx.commit().await?;

        info!(images = product.images.len(), "Product deleted");
        Ok(())
    }

    /// The orders one of the caller's products appears in, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Product)` or `AccessDenied`.
    #[instrument(skip(self, user), fields(product_id = %id))]
    pub async fn product_orders(
        &self,
        user: &CurrentUser,
        id: ProductId,
    ) -> Result<Vec<ProductOrderRef>, AppError> {
        let product = self.get_product(id).await?;
        require_store_access(user, product.store_id)?;

        Ok(db::products::order_refs(&self.pool, id).await?)
    }
}

fn ensure_unordered(line_count: i64) -> Result<(), AppError> {
    if line_count > 0 {
        return Err(AppError::Conflict(
            "Product has orders and cannot be deleted".to_owned(),
        ));
    }
    Ok(())
}
