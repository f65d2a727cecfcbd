//! Database operations for saved products.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use mercato_core::{ProductId, UserId};

use super::RepositoryError;
use super::products::{SUMMARY_COLUMNS, SummaryRow};
use crate::models::wishlist::WishlistItem;

#[derive(Debug, sqlx::FromRow)]
struct WishlistRow {
    added_at: DateTime<Utc>,
    #[sqlx(flatten)]
    product: SummaryRow,
}

/// Save a product to a user's wishlist.
///
/// Returns `false` if it was already saved.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn add<'e>(
    executor: impl PgExecutor<'e>,
    user_id: UserId,
    product_id: ProductId,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        INSERT INTO storefront.wishlist_item (user_id, product_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        ",
    )
    .bind(user_id)
    .bind(product_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a product from a user's wishlist.
///
/// Returns `true` if it was saved.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the delete fails.
pub async fn remove<'e>(
    executor: impl PgExecutor<'e>,
    user_id: UserId,
    product_id: ProductId,
) -> Result<bool, RepositoryError> {
    let result =
        sqlx::query("DELETE FROM storefront.wishlist_item WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(executor)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// List a user's saved products, oldest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list<'e>(
    executor: impl PgExecutor<'e>,
    user_id: UserId,
) -> Result<Vec<WishlistItem>, RepositoryError> {
    let sql = format!(
        r"
        SELECT w.added_at, {SUMMARY_COLUMNS}
        FROM storefront.wishlist_item w
        JOIN storefront.product p ON p.id = w.product_id
        WHERE w.user_id = $1
        ORDER BY w.added_at, p.id
        "
    );
    let rows = sqlx::query_as::<_, WishlistRow>(&sql)
        .bind(user_id)
        .fetch_all(executor)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| WishlistItem {
            product: row.product.into(),
            added_at: row.added_at,
        })
        .collect())
}
