//! Cart, wishlist and dashboard behaviour against a real database.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;
use sqlx::PgPool;

use mercato_core::{OrderStatus, ProductId};
use mercato_integration_tests::{cod_checkout, seed_customer, seed_product, seed_store};
use mercato_storefront::error::AppError;
use mercato_storefront::models::cart::{CartEntryPatch, CartToggle, ToggleCartRequest};
use mercato_storefront::models::order::UpdateStatusRequest;
use mercato_storefront::models::review::AddReviewRequest;
use mercato_storefront::models::wishlist::{ToggleWishlistRequest, WishlistToggle};
use mercato_storefront::services::cart::CartService;
use mercato_storefront::services::dashboard::DashboardService;
use mercato_storefront::services::orders::OrderService;
use mercato_storefront::services::reviews::ReviewService;
use mercato_storefront::services::wishlist::WishlistService;

fn toggle(item: ProductId) -> ToggleCartRequest {
    ToggleCartRequest {
        item: Some(item),
        color: Some("indigo".to_string()),
        size: Some("M".to_string()),
        sell_price: Some(Decimal::new(49_900, 2)),
        quantity: Some(1),
    }
}

#[sqlx::test(migrator = "mercato_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_cart_toggle_is_self_inverse(pool: PgPool) {
    let admin = seed_store(&pool, "Loom").await.unwrap();
    let kurta = seed_product(&pool, admin.store_id.unwrap(), "Kurta", 10).await.unwrap();
    let shopper = seed_customer(&pool, "a@mercato.test").await.unwrap();
    let cart = CartService::new(pool.clone());

    assert_eq!(cart.toggle_item(&shopper, toggle(kurta)).await.unwrap(), CartToggle::Added);
    let patch = CartEntryPatch {
        quantity: Some(3),
        ..CartEntryPatch::default()
    };
    let entry = cart.update_entry(&shopper, kurta, patch).await.unwrap();
    assert_eq!((entry.quantity, entry.color.as_str()), (3, "indigo"));

    let lines = cart.get_cart(&shopper).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product.name, "Kurta");

    assert_eq!(cart.toggle_item(&shopper, toggle(kurta)).await.unwrap(), CartToggle::Removed);
    assert!(cart.get_cart(&shopper).await.unwrap().is_empty());

    let missing = cart.toggle_item(&shopper, toggle(ProductId::new(9999))).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[sqlx::test(migrator = "mercato_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_wishlist_toggle(pool: PgPool) {
    let admin = seed_store(&pool, "Loom").await.unwrap();
    let kurta = seed_product(&pool, admin.store_id.unwrap(), "Kurta", 10).await.unwrap();
    let shopper = seed_customer(&pool, "a@mercato.test").await.unwrap();
    let wishlist = WishlistService::new(pool.clone());
    let request = || ToggleWishlistRequest { item: Some(kurta) };

    assert_eq!(wishlist.toggle_item(&shopper, request()).await.unwrap(), WishlistToggle::Added);
    assert_eq!(wishlist.get_wishlist(&shopper).await.unwrap().len(), 1);
    assert_eq!(wishlist.toggle_item(&shopper, request()).await.unwrap(), WishlistToggle::Removed);
    assert!(wishlist.get_wishlist(&shopper).await.unwrap().is_empty());
}

#[sqlx::test(migrator = "mercato_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_dashboard_reflects_live_data(pool: PgPool) {
    let loom = seed_store(&pool, "Loom").await.unwrap();
    let spice = seed_store(&pool, "Spice").await.unwrap();
    let kurta = seed_product(&pool, loom.store_id.unwrap(), "Kurta", 10).await.unwrap();
    seed_product(&pool, loom.store_id.unwrap(), "Stole", 10).await.unwrap();
    let chilli = seed_product(&pool, spice.store_id.unwrap(), "Chilli", 10).await.unwrap();
    let shopper = seed_customer(&pool, "a@mercato.test").await.unwrap();
    let orders = OrderService::new(pool.clone(), 5);
    let to = |status| UpdateStatusRequest {
        status: Some(status),
    };

    let delivered = orders
        .create_order(
            &shopper,
            cod_checkout(&[(kurta, 2), (chilli, 1)], Decimal::new(500, 0), Decimal::new(50, 0)),
        )
        .await
        .unwrap();
    orders
        .update_status(&loom, delivered.order.id, to(OrderStatus::Delivered))
        .await
        .unwrap();

    let cancelled = orders
        .create_order(&shopper, cod_checkout(&[(kurta, 1)], Decimal::new(200, 0), Decimal::ZERO))
        .await
        .unwrap();
    orders
        .update_status(&loom, cancelled.order.id, to(OrderStatus::Cancelled))
        .await
        .unwrap();

    orders
        .create_order(&shopper, cod_checkout(&[(kurta, 1)], Decimal::new(100, 0), Decimal::ZERO))
        .await
        .unwrap();

    ReviewService::new(pool.clone())
        .add_review(
            &shopper,
            AddReviewRequest {
                product: Some(kurta),
                rating: Some(5),
                review: Some("Lovely".to_string()),
                images: Vec::new(),
            },
        )
        .await
        .unwrap();

    let metrics = DashboardService::new(pool.clone()).metrics(&loom).await.unwrap();
    assert_eq!(metrics.products, 2);
    assert_eq!(metrics.total_sold, 4);
    assert_eq!(metrics.total_orders, 3);
    assert_eq!(metrics.total_reviews, 1);
    assert_eq!(metrics.total_completed_orders, 1);
    assert_eq!(metrics.total_cancelled_orders, 1);
    assert_eq!(metrics.total_pending_orders, 1);
    assert_eq!(metrics.total_sell, Decimal::new(450, 0));

    // The shared delivered order counts in full for the other store too.
    let spice_metrics = DashboardService::new(pool.clone()).metrics(&spice).await.unwrap();
    assert_eq!(spice_metrics.total_orders, 1);
    assert_eq!(spice_metrics.total_sell, Decimal::new(450, 0));

    let denied = DashboardService::new(pool.clone()).metrics(&shopper).await;
    assert!(matches!(denied, Err(AppError::AccessDenied)));
}
