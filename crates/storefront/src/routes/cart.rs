//! Cart route handlers.

use axum::extract::State;
use tracing::instrument;

use mercato_core::ProductId;

use super::{JsonBody, PathId};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::cart::{CartEntry, CartEntryPatch, CartLine, CartToggle, ToggleCartRequest};
use crate::response::ApiResponse;
use crate::services::cart::CartService;
use crate::state::AppState;

/// The caller's cart with product details.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse<Vec<CartLine>>> {
    let service = CartService::new(state.pool().clone());
    Ok(ApiResponse::ok(service.get_cart(&user).await?))
}

/// Add a product to the cart, or remove it if it's already there.
#[instrument(skip(state, user, request))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(request): JsonBody<ToggleCartRequest>,
) -> Result<ApiResponse<CartToggle>> {
    let service = CartService::new(state.pool().clone());
    let outcome = service.toggle_item(&user, request).await?;
    Ok(ApiResponse::ok(outcome).with_message(outcome.message()))
}

/// Update the cart entry for a product.
#[instrument(skip(state, user, patch))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathId(product_id): PathId<ProductId>,
    JsonBody(patch): JsonBody<CartEntryPatch>,
) -> Result<ApiResponse<CartEntry>> {
    let service = CartService::new(state.pool().clone());
    let entry = service.update_entry(&user, product_id, patch).await?;
    Ok(ApiResponse::ok(entry).with_message("Cart updated"))
}
