//! Store admin route handlers.
//!
//! Every handler requires an admin session with a store; the services check
//! that the touched product, order or review belongs to that store.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use mercato_core::{OrderId, ProductId, ReviewId};

use super::{JsonBody, PathId};
use crate::error::Result;
use crate::middleware::RequireStoreAdmin;
use crate::models::dashboard::DashboardMetrics;
use crate::models::order::{Order, OrderDetail, UpdateStatusRequest};
use crate::models::product::{CreateProductRequest, Product, ProductOrderRef, UpdateProductRequest};
use crate::models::review::{ReplyRequest, Review};
use crate::response::ApiResponse;
use crate::services::dashboard::DashboardService;
use crate::services::inventory::InventoryService;
use crate::services::orders::OrderService;
use crate::services::reviews::ReviewService;
use crate::state::AppState;

fn inventory_service(state: &AppState) -> InventoryService {
    InventoryService::new(state.pool().clone(), state.assets().cloned())
}

fn order_service(state: &AppState) -> OrderService {
    OrderService::new(state.pool().clone(), state.config().delivery_days)
}

/// Store metrics recomputed from live data.
#[instrument(skip(state, user), fields(store_id = %store))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireStoreAdmin(user, store): RequireStoreAdmin,
) -> Result<ApiResponse<DashboardMetrics>> {
    let service = DashboardService::new(state.pool().clone());
    Ok(ApiResponse::ok(service.metrics(&user).await?))
}

/// The store's orders, each narrowed to the store's own lines.
#[instrument(skip(state, user), fields(store_id = %store))]
pub async fn orders(
    State(state): State<AppState>,
    RequireStoreAdmin(user, store): RequireStoreAdmin,
) -> Result<ApiResponse<Vec<OrderDetail>>> {
    Ok(ApiResponse::ok(order_service(&state).store_orders(&user).await?))
}

/// Move an order to a new status.
#[instrument(skip(state, user, request), fields(store_id = %store))]
pub async fn update_order_status(
    State(state): State<AppState>,
    RequireStoreAdmin(user, store): RequireStoreAdmin,
    PathId(id): PathId<OrderId>,
    JsonBody(request): JsonBody<UpdateStatusRequest>,
) -> Result<ApiResponse<Order>> {
    let order = order_service(&state).update_status(&user, id, request).await?;
    let message = format!("Order {}", order.status);
    Ok(ApiResponse::ok(order).with_message(message))
}

/// Add a product to the store.
#[instrument(skip(state, user, request), fields(store_id = %store))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireStoreAdmin(user, store): RequireStoreAdmin,
    JsonBody(request): JsonBody<CreateProductRequest>,
) -> Result<(StatusCode, ApiResponse<Product>)> {
    let product = inventory_service(&state).create_product(&user, request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(product).with_message("Product created"),
    ))
}

/// Update one of the store's products.
#[instrument(skip(state, user, request), fields(store_id = %store))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireStoreAdmin(user, store): RequireStoreAdmin,
    PathId(id): PathId<ProductId>,
    JsonBody(request): JsonBody<UpdateProductRequest>,
) -> Result<ApiResponse<Product>> {
    let product = inventory_service(&state).update_product(&user, id, request).await?;
    Ok(ApiResponse::ok(product).with_message("Product updated"))
}

/// Delete one of the store's products and its images.
#[instrument(skip(state, user), fields(store_id = %store))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireStoreAdmin(user, store): RequireStoreAdmin,
    PathId(id): PathId<ProductId>,
) -> Result<ApiResponse<()>> {
    inventory_service(&state).delete_product(&user, id).await?;
    Ok(ApiResponse::message("Product deleted"))
}

/// The orders a product appears in.
#[instrument(skip(state, user), fields(store_id = %store))]
pub async fn product_orders(
    State(state): State<AppState>,
    RequireStoreAdmin(user, store): RequireStoreAdmin,
    PathId(id): PathId<ProductId>,
) -> Result<ApiResponse<Vec<ProductOrderRef>>> {
    Ok(ApiResponse::ok(inventory_service(&state).product_orders(&user, id).await?))
}

/// Answer a review of one of the store's products.
#[instrument(skip(state, user, request), fields(store_id = %store))]
pub async fn reply_to_review(
    State(state): State<AppState>,
    RequireStoreAdmin(user, store): RequireStoreAdmin,
    PathId(id): PathId<ReviewId>,
    JsonBody(request): JsonBody<ReplyRequest>,
) -> Result<ApiResponse<Review>> {
    let service = ReviewService::new(state.pool().clone());
    let review = service.reply(&user, id, request).await?;
    Ok(ApiResponse::ok(review).with_message("Reply saved"))
}
