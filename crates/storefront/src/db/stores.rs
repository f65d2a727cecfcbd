//! Database operations for stores and their reporting tallies.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgExecutor;

use mercato_core::{OrderStatus, StoreId, UserId};

use super::RepositoryError;
use crate::models::dashboard::{OrderTally, ProductTally};
use crate::models::store::Store;

#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: StoreId,
    name: String,
    owner_id: Option<UserId>,
    created_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            owner_id: row.owner_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductTallyRow {
    sold: i32,
    review_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderTallyRow {
    status: OrderStatus,
    amount: Decimal,
    delivery_charge: Decimal,
}

/// Get a store by ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: StoreId,
) -> Result<Option<Store>, RepositoryError> {
    let row = sqlx::query_as::<_, StoreRow>(
        "SELECT id, name, owner_id, created_at FROM storefront.store WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Store::from))
}

/// Create a store without an owner.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn create<'e>(executor: impl PgExecutor<'e>, name: &str) -> Result<Store, RepositoryError> {
    let row = sqlx::query_as::<_, StoreRow>(
        r"
        INSERT INTO storefront.store (name)
        VALUES ($1)
        RETURNING id, name, owner_id, created_at
        ",
    )
    .bind(name)
    .fetch_one(executor)
    .await?;

    Ok(row.into())
}

/// Record the admin who owns a store.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the store doesn't exist.
/// Returns `RepositoryError::Database` if the update fails.
pub async fn set_owner<'e>(
    executor: impl PgExecutor<'e>,
    id: StoreId,
    owner_id: UserId,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE storefront.store SET owner_id = $2 WHERE id = $1")
        .bind(id)
        .bind(owner_id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Sold and review counters for every product of a store.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn product_tallies<'e>(
    executor: impl PgExecutor<'e>,
    store_id: StoreId,
) -> Result<Vec<ProductTally>, RepositoryError> {
    let rows = sqlx::query_as::<_, ProductTallyRow>(
        r"
        SELECT p.sold,
               (SELECT count(*) FROM storefront.review r WHERE r.product_id = p.id) AS review_count
        FROM storefront.product p
        WHERE p.store_id = $1
        ",
    )
    .bind(store_id)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ProductTally {
            sold: r.sold,
            review_count: r.review_count,
        })
        .collect())
}

/// Status and totals of every order holding at least one of the store's
/// products. Each order appears once.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn order_tallies<'e>(
    executor: impl PgExecutor<'e>,
    store_id: StoreId,
) -> Result<Vec<OrderTally>, RepositoryError> {
    let rows = sqlx::query_as::<_, OrderTallyRow>(
        r"
        SELECT o.status, o.amount, o.delivery_charge
        FROM storefront.order o
        WHERE EXISTS (
            SELECT 1
            FROM storefront.order_line l
            JOIN storefront.product p ON p.id = l.product_id
            WHERE l.order_id = o.id AND p.store_id = $1
        )
        ",
    )
    .bind(store_id)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| OrderTally {
            status: r.status,
            amount: r.amount,
            delivery_charge: r.delivery_charge,
        })
        .collect())
}
