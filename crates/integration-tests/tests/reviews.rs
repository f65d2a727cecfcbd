//! Review lifecycle and rating aggregation against a real database.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;
use sqlx::PgPool;

use mercato_integration_tests::{seed_customer, seed_product, seed_store};
use mercato_storefront::error::AppError;
use mercato_storefront::models::review::{AddReviewRequest, ReplyRequest, UpdateReviewRequest};
use mercato_storefront::services::inventory::InventoryService;
use mercato_storefront::services::reviews::ReviewService;

fn review(product: mercato_core::ProductId, rating: i64, text: &str) -> AddReviewRequest {
    AddReviewRequest {
        product: Some(product),
        rating: Some(rating),
        review: Some(text.to_string()),
        images: Vec::new(),
    }
}

async fn avg_rating(pool: &PgPool, product: mercato_core::ProductId) -> Decimal {
    InventoryService::new(pool.clone(), None)
        .get_product(product)
        .await
        .unwrap()
        .avg_rating
}

#[sqlx::test(migrator = "mercato_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_rating_follows_review_writes(pool: PgPool) {
    let admin = seed_store(&pool, "Loom").await.unwrap();
    let kurta = seed_product(&pool, admin.store_id.unwrap(), "Kurta", 10).await.unwrap();
    let asha = seed_customer(&pool, "asha@mercato.test").await.unwrap();
    let ravi = seed_customer(&pool, "ravi@mercato.test").await.unwrap();
    let service = ReviewService::new(pool.clone());

    assert_eq!(avg_rating(&pool, kurta).await, Decimal::ZERO);

    let first = service.add_review(&asha, review(kurta, 4, "Soft")).await.unwrap();
    let second = service.add_review(&ravi, review(kurta, 5, "Great fit")).await.unwrap();
    assert_eq!(avg_rating(&pool, kurta).await, Decimal::new(450, 2));

    service
        .update_review(
            &ravi,
            second.id,
            UpdateReviewRequest {
                rating: Some(1),
                review: Some("Shrank".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(avg_rating(&pool, kurta).await, Decimal::new(250, 2));

    service.delete_review(&ravi, second.id).await.unwrap();
    assert!(matches!(
        service.get_review(second.id).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(avg_rating(&pool, kurta).await, Decimal::new(4, 0));
    assert_eq!(service.product_reviews(kurta).await.unwrap(), vec![first.clone()]);

    // The deleted review leaves its author's list; other authors are untouched.
    assert!(service.user_reviews(&ravi).await.unwrap().is_empty());
    assert_eq!(service.user_reviews(&asha).await.unwrap(), vec![first]);
}

#[sqlx::test(migrator = "mercato_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_only_author_edits_and_only_owner_replies(pool: PgPool) {
    let loom = seed_store(&pool, "Loom").await.unwrap();
    let spice = seed_store(&pool, "Spice").await.unwrap();
    let kurta = seed_product(&pool, loom.store_id.unwrap(), "Kurta", 10).await.unwrap();
    let asha = seed_customer(&pool, "asha@mercato.test").await.unwrap();
    let ravi = seed_customer(&pool, "ravi@mercato.test").await.unwrap();
    let service = ReviewService::new(pool.clone());

    let posted = service.add_review(&asha, review(kurta, 3, "Fine")).await.unwrap();

    let hijack = service.delete_review(&ravi, posted.id).await;
    assert!(matches!(hijack, Err(AppError::AccessDenied)));

    let reply = |text: &str| ReplyRequest {
        reply: Some(text.to_string()),
    };
    let foreign = service.reply(&spice, posted.id, reply("Not ours")).await;
    assert!(matches!(foreign, Err(AppError::AccessDenied)));

    let answered = service.reply(&loom, posted.id, reply("Thanks!")).await.unwrap();
    assert_eq!(answered.reply.as_deref(), Some("Thanks!"));
    assert_eq!(service.user_reviews(&asha).await.unwrap().len(), 1);
}
