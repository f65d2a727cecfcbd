//! Wishlist route handlers.

use axum::extract::State;
use tracing::instrument;

use super::JsonBody;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::wishlist::{ToggleWishlistRequest, WishlistItem, WishlistToggle};
use crate::response::ApiResponse;
use crate::services::wishlist::WishlistService;
use crate::state::AppState;

/// The caller's saved products.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse<Vec<WishlistItem>>> {
    let service = WishlistService::new(state.pool().clone());
    Ok(ApiResponse::ok(service.get_wishlist(&user).await?))
}

/// Save or unsave a product.
#[instrument(skip(state, user, request))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(request): JsonBody<ToggleWishlistRequest>,
) -> Result<ApiResponse<WishlistToggle>> {
    let service = WishlistService::new(state.pool().clone());
    let outcome = service.toggle_item(&user, request).await?;
    Ok(ApiResponse::ok(outcome).with_message(outcome.message()))
}
