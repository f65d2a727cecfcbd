//! Shopper order route handlers.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use mercato_core::OrderId;

use super::{JsonBody, PathId};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::order::{CheckoutRequest, OrderDetail};
use crate::response::ApiResponse;
use crate::services::orders::OrderService;
use crate::state::AppState;

fn service(state: &AppState) -> OrderService {
    OrderService::new(state.pool().clone(), state.config().delivery_days)
}

/// Checkout: place an order for the caller.
#[instrument(skip(state, user, request))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(request): JsonBody<CheckoutRequest>,
) -> Result<(StatusCode, ApiResponse<OrderDetail>)> {
    let order = service(&state).create_order(&user, request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(order).with_message("Order placed"),
    ))
}

/// The caller's orders, newest first.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse<Vec<OrderDetail>>> {
    Ok(ApiResponse::ok(service(&state).customer_orders(&user).await?))
}

/// One of the caller's orders.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathId(id): PathId<OrderId>,
) -> Result<ApiResponse<OrderDetail>> {
    Ok(ApiResponse::ok(service(&state).customer_order(&user, id).await?))
}
