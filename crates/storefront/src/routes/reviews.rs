//! Review route handlers.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use mercato_core::ReviewId;

use super::{JsonBody, PathId};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::review::{AddReviewRequest, Review, UpdateReviewRequest};
use crate::response::ApiResponse;
use crate::services::reviews::ReviewService;
use crate::state::AppState;

/// Review a product.
#[instrument(skip(state, user, request))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    JsonBody(request): JsonBody<AddReviewRequest>,
) -> Result<(StatusCode, ApiResponse<Review>)> {
    let service = ReviewService::new(state.pool().clone());
    let review = service.add_review(&user, request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(review).with_message("Review added"),
    ))
}

/// The caller's reviews, newest first.
#[instrument(skip(state, user))]
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse<Vec<Review>>> {
    let service = ReviewService::new(state.pool().clone());
    Ok(ApiResponse::ok(service.user_reviews(&user).await?))
}

/// One review.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    PathId(id): PathId<ReviewId>,
) -> Result<ApiResponse<Review>> {
    let service = ReviewService::new(state.pool().clone());
    Ok(ApiResponse::ok(service.get_review(id).await?))
}

/// Edit one of the caller's reviews.
#[instrument(skip(state, user, request))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathId(id): PathId<ReviewId>,
    JsonBody(request): JsonBody<UpdateReviewRequest>,
) -> Result<ApiResponse<Review>> {
    let service = ReviewService::new(state.pool().clone());
    let review = service.update_review(&user, id, request).await?;
    Ok(ApiResponse::ok(review).with_message("Review updated"))
}

/// Delete one of the caller's reviews.
#[instrument(skip(state, user))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PathId(id): PathId<ReviewId>,
) -> Result<ApiResponse<()>> {
    let service = ReviewService::new(state.pool().clone());
    service.delete_review(&user, id).await?;
    Ok(ApiResponse::message("Review deleted"))
}
