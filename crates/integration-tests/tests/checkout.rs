//! Checkout and order lifecycle against a real database.
//!
//! Each test gets a fresh database with migrations applied.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;
use sqlx::PgPool;

use mercato_core::{OrderStatus, ProductId};
use mercato_integration_tests::{cod_checkout, seed_customer, seed_product, seed_store};
use mercato_storefront::error::AppError;
use mercato_storefront::models::order::UpdateStatusRequest;
use mercato_storefront::services::inventory::InventoryService;
use mercato_storefront::services::orders::OrderService;

fn orders(pool: &PgPool) -> OrderService {
    OrderService::new(pool.clone(), 5)
}

fn inventory(pool: &PgPool) -> InventoryService {
    InventoryService::new(pool.clone(), None)
}

async fn order_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM storefront.order")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrator = "mercato_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_checkout_places_one_order(pool: PgPool) {
    let admin = seed_store(&pool, "Loom").await.unwrap();
    let store = admin.store_id.unwrap();
    let shopper = seed_customer(&pool, "a@mercato.test").await.unwrap();
    let kurta = seed_product(&pool, store, "Kurta", 10).await.unwrap();
    let stole = seed_product(&pool, store, "Stole", 10).await.unwrap();

    let detail = orders(&pool)
        .create_order(
            &shopper,
            cod_checkout(&[(kurta, 2), (stole, 1)], Decimal::new(1547, 0), Decimal::new(50, 0)),
        )
        .await
        .unwrap();

    assert_eq!(order_count(&pool).await, 1);
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.customer_id, shopper.id);
    let items: Vec<ProductId> = detail.products.iter().map(|l| l.item).collect();
    assert_eq!(items, vec![kurta, stole]);

    let kurta = inventory(&pool).get_product(kurta).await.unwrap();
    assert_eq!((kurta.stock, kurta.sold), (8, 2));
}

#[sqlx::test(migrator = "mercato_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_unknown_product_writes_nothing(pool: PgPool) {
    let admin = seed_store(&pool, "Loom").await.unwrap();
    let shopper = seed_customer(&pool, "a@mercato.test").await.unwrap();
    let kurta = seed_product(&pool, admin.store_id.unwrap(), "Kurta", 10).await.unwrap();

    let result = orders(&pool)
        .create_order(
            &shopper,
            cod_checkout(&[(kurta, 1), (ProductId::new(9999), 1)], Decimal::ONE_HUNDRED, Decimal::ZERO),
        )
        .await;

    assert!(matches!(result, Err(AppError::ProductNotFound)));
    assert_eq!(order_count(&pool).await, 0);
    assert_eq!(inventory(&pool).get_product(kurta).await.unwrap().stock, 10);
}

#[sqlx::test(migrator = "mercato_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_stock_runs_out(pool: PgPool) {
    let admin = seed_store(&pool, "Spice").await.unwrap();
    let shopper = seed_customer(&pool, "a@mercato.test").await.unwrap();
    let cardamom = seed_product(&pool, admin.store_id.unwrap(), "Cardamom", 5).await.unwrap();
    let service = orders(&pool);

    service
        .create_order(&shopper, cod_checkout(&[(cardamom, 5)], Decimal::ONE_HUNDRED, Decimal::ZERO))
        .await
        .unwrap();
    let product = inventory(&pool).get_product(cardamom).await.unwrap();
    assert_eq!((product.stock, product.sold), (0, 5));

    let result = service
        .create_order(&shopper, cod_checkout(&[(cardamom, 1)], Decimal::TEN, Decimal::ZERO))
        .await;
    assert!(matches!(result, Err(AppError::OutOfStock(id)) if id == cardamom));
    assert_eq!(order_count(&pool).await, 1);
}

#[sqlx::test(migrator = "mercato_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_cross_store_order_is_split_per_store(pool: PgPool) {
    let loom = seed_store(&pool, "Loom").await.unwrap();
    let spice = seed_store(&pool, "Spice").await.unwrap();
    let outsider = seed_store(&pool, "Outsider").await.unwrap();
    let shopper = seed_customer(&pool, "a@mercato.test").await.unwrap();
    let kurta = seed_product(&pool, loom.store_id.unwrap(), "Kurta", 10).await.unwrap();
    let chilli = seed_product(&pool, spice.store_id.unwrap(), "Chilli", 10).await.unwrap();
    let service = orders(&pool);

    let placed = service
        .create_order(
            &shopper,
            cod_checkout(&[(kurta, 1), (chilli, 3)], Decimal::new(947, 0), Decimal::new(40, 0)),
        )
        .await
        .unwrap();

    let loom_view = service.store_orders(&loom).await.unwrap();
    assert_eq!(loom_view.len(), 1);
    assert_eq!(loom_view[0].products.len(), 1);
    assert_eq!(loom_view[0].products[0].item, kurta);

    let spice_view = service.store_orders(&spice).await.unwrap();
    assert_eq!(spice_view.len(), 1);
    assert_eq!(spice_view[0].products[0].item, chilli);
    assert_eq!(spice_view[0].order.amount, loom_view[0].order.amount);

    assert!(service.store_orders(&outsider).await.unwrap().is_empty());

    let denied = service
        .update_status(
            &outsider,
            placed.order.id,
            UpdateStatusRequest {
                status: Some(OrderStatus::Dispatched),
            },
        )
        .await;
    assert!(matches!(denied, Err(AppError::AccessDenied)));

    let shopper_view = service.customer_order(&shopper, placed.order.id).await.unwrap();
    assert_eq!(shopper_view.products.len(), 2);
}

#[sqlx::test(migrator = "mercato_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_cancelled_order_is_terminal(pool: PgPool) {
    let admin = seed_store(&pool, "Loom").await.unwrap();
    let shopper = seed_customer(&pool, "a@mercato.test").await.unwrap();
    let kurta = seed_product(&pool, admin.store_id.unwrap(), "Kurta", 10).await.unwrap();
    let service = orders(&pool);
    let placed = service
        .create_order(&shopper, cod_checkout(&[(kurta, 1)], Decimal::TEN, Decimal::ZERO))
        .await
        .unwrap();
    let to = |status| UpdateStatusRequest {
        status: Some(status),
    };

    let shipped = service
        .update_status(&admin, placed.order.id, to(OrderStatus::Shipped))
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);

    // Moving backwards is allowed.
    let pending = service
        .update_status(&admin, placed.order.id, to(OrderStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.status, OrderStatus::Pending);

    service
        .update_status(&admin, placed.order.id, to(OrderStatus::Cancelled))
        .await
        .unwrap();
    let reopened = service
        .update_status(&admin, placed.order.id, to(OrderStatus::Pending))
        .await;
    assert!(matches!(reopened, Err(AppError::InvalidTransition(_))));
}

#[sqlx::test(migrator = "mercato_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_ordered_product_cannot_be_deleted(pool: PgPool) {
    let admin = seed_store(&pool, "Loom").await.unwrap();
    let shopper = seed_customer(&pool, "a@mercato.test").await.unwrap();
    let kurta = seed_product(&pool, admin.store_id.unwrap(), "Kurta", 10).await.unwrap();
    let spare = seed_product(&pool, admin.store_id.unwrap(), "Spare", 10).await.unwrap();
    orders(&pool)
        .create_order(&shopper, cod_checkout(&[(kurta, 1)], Decimal::TEN, Decimal::ZERO))
        .await
        .unwrap();

    let result = inventory(&pool).delete_product(&admin, kurta).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let refs = inventory(&pool).product_orders(&admin, kurta).await.unwrap();
    assert_eq!(refs.len(), 1);

    // No images, so no asset host is needed.
    inventory(&pool).delete_product(&admin, spare).await.unwrap();
    assert!(matches!(
        inventory(&pool).get_product(spare).await,
        Err(AppError::NotFound(_))
    ));
}

async fn attach_images(pool: &PgPool, product: ProductId, images: &[&str]) {
    let images: Vec<String> = images.iter().map(|s| (*s).to_string()).collect();
    sqlx::query("UPDATE storefront.product SET images = $1 WHERE id = $2")
        .bind(&images)
        .bind(product)
        .execute(pool)
        .await
        .unwrap();
}

#[sqlx::test(migrator = "mercato_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_product_delete_checks_orders_before_touching_images(pool: PgPool) {
    let admin = seed_store(&pool, "Loom").await.unwrap();
    let shopper = seed_customer(&pool, "a@mercato.test").await.unwrap();
    let kurta = seed_product(&pool, admin.store_id.unwrap(), "Kurta", 10).await.unwrap();
    let scarf = seed_product(&pool, admin.store_id.unwrap(), "Scarf", 10).await.unwrap();
    attach_images(&pool, kurta, &["https://assets.mercato.test/kurta-front.jpg"]).await;
    attach_images(&pool, scarf, &["https://assets.mercato.test/scarf.jpg"]).await;
    orders(&pool)
        .create_order(&shopper, cod_checkout(&[(kurta, 1)], Decimal::TEN, Decimal::ZERO))
        .await
        .unwrap();

    // The order check runs before the (unconfigured) asset host is needed.
    let ordered = inventory(&pool).delete_product(&admin, kurta).await;
    assert!(matches!(ordered, Err(AppError::Conflict(_))));

    // Image removal fails, so the row is left alone.
    let unhosted = inventory(&pool).delete_product(&admin, scarf).await;
    assert!(matches!(unhosted, Err(AppError::Asset(_))));
    let kept = inventory(&pool).get_product(scarf).await.unwrap();
    assert_eq!(kept.images.len(), 1);
}
