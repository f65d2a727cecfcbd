//! Mercato storefront library.
//!
//! Shopper and store-admin JSON API for a multi-store marketplace. Exposed as
//! a library so the binary, the CLI and the integration tests share one
//! router and one data layer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, http::Request};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the full application router with its middleware stack.
///
/// Layers, outermost first: Sentry hub and transaction, request tracing,
/// request id, sessions.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.pool(), state.config());

    routes::routes()
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
