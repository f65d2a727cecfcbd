//! Public catalog route handlers.

use axum::extract::State;
use tracing::instrument;

use mercato_core::{ProductId, StoreId};

use super::PathId;
use crate::error::Result;
use crate::models::product::Product;
use crate::models::review::Review;
use crate::response::ApiResponse;
use crate::services::inventory::InventoryService;
use crate::services::reviews::ReviewService;
use crate::state::AppState;

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    PathId(id): PathId<ProductId>,
) -> Result<ApiResponse<Product>> {
    let service = InventoryService::new(state.pool().clone(), state.assets().cloned());
    Ok(ApiResponse::ok(service.get_product(id).await?))
}

/// A product's reviews, newest first.
#[instrument(skip(state))]
pub async fn reviews(
    State(state): State<AppState>,
    PathId(id): PathId<ProductId>,
) -> Result<ApiResponse<Vec<Review>>> {
    let service = ReviewService::new(state.pool().clone());
    Ok(ApiResponse::ok(service.product_reviews(id).await?))
}

/// A store's products, newest first.
#[instrument(skip(state))]
pub async fn store_catalog(
    State(state): State<AppState>,
    PathId(store_id): PathId<StoreId>,
) -> Result<ApiResponse<Vec<Product>>> {
    let service = InventoryService::new(state.pool().clone(), state.assets().cloned());
    Ok(ApiResponse::ok(service.list_store_products(store_id).await?))
}
