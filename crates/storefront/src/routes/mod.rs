//! HTTP route handlers for the storefront API.
//!
//! Every handler answers with the JSON envelope from [`crate::response`].
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness
//! GET    /health/ready                - Readiness (database ping)
//!
//! # Catalog (public)
//! GET    /products/{id}               - Product detail
//! GET    /products/{id}/reviews       - Product reviews, newest first
//! GET    /stores/{id}/products        - Store catalog
//!
//! # Shopper (requires auth)
//! GET    /cart                        - Cart with product details
//! POST   /cart/toggle                 - Add or remove a product
//! PATCH  /cart/{product_id}           - Update a cart entry
//! GET    /wishlist                    - Saved products
//! POST   /wishlist/toggle             - Save or unsave a product
//! POST   /orders                      - Checkout
//! GET    /orders                      - Order history
//! GET    /orders/{id}                 - One order
//! POST   /reviews                     - Review a product
//! GET    /reviews/mine                - Own reviews
//! GET    /reviews/{id}                - One review
//! PATCH  /reviews/{id}                - Edit own review
//! DELETE /reviews/{id}                - Delete own review
//!
//! # Store admin (requires admin with a store)
//! GET    /admin/dashboard             - Store metrics
//! GET    /admin/orders                - Store's view of its orders
//! PATCH  /admin/orders/{id}/status    - Order status transition
//! POST   /admin/products              - Create product
//! PATCH  /admin/products/{id}         - Update product
//! DELETE /admin/products/{id}         - Delete product and its images
//! GET    /admin/products/{id}/orders  - Product order ledger
//! POST   /admin/reviews/{id}/reply    - Reply to a review
//! ```

pub mod admin;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod wishlist;

use axum::{
    Router,
    extract::{FromRequest, FromRequestParts},
    routing::{get, patch, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejection is the standard failure envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Path extractor whose rejection is the standard failure envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathId<T>(pub T);

/// Create the shopper cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/toggle", post(cart::toggle))
        .route("/{product_id}", patch(cart::update))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
}

/// Create the shopper order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::create))
        .route("/mine", get(reviews::mine))
        .route(
            "/{id}",
            get(reviews::show)
                .patch(reviews::update)
                .delete(reviews::destroy),
        )
}

/// Create the store admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/orders", get(admin::orders))
        .route("/orders/{id}/status", patch(admin::update_order_status))
        .route("/products", post(admin::create_product))
        .route(
            "/products/{id}",
            patch(admin::update_product).delete(admin::delete_product),
        )
        .route("/products/{id}/orders", get(admin::product_orders))
        .route("/reviews/{id}/reply", post(admin::reply_to_review))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/products/{id}", get(products::show))
        .route("/products/{id}/reviews", get(products::reviews))
        .route("/stores/{id}/products", get(products::store_catalog))
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/orders", order_routes())
        .nest("/reviews", review_routes())
        .nest("/admin", admin_routes())
}
