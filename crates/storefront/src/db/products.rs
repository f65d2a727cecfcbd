//! Database operations for catalog products and their inventory counters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgExecutor;
use sqlx::types::Json;

use mercato_core::{OrderId, OrderStatus, ProductId, ProductStatus, SizePrice, StoreId};

use super::RepositoryError;
use crate::models::order::StockLevel;
use crate::models::product::{NewProduct, Product, ProductOrderRef, ProductSummary};

/// Columns of a full product row, for `FROM storefront.product p`.
const PRODUCT_COLUMNS: &str = r"
    p.id, p.store_id, p.name, p.description, p.status, p.price, p.colors, p.sizes,
    p.gws, p.images, p.stock, p.sold, p.avg_rating,
    (SELECT count(*) FROM storefront.review r WHERE r.product_id = p.id) AS review_count,
    p.created_at, p.updated_at
";

/// Columns read into a [`SummaryRow`], for a join on `storefront.product p`.
pub(super) const SUMMARY_COLUMNS: &str =
    "p.id AS product_id, p.store_id, p.name, p.status, p.price, p.images[1] AS image, p.stock";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    store_id: StoreId,
    name: String,
    description: String,
    status: ProductStatus,
    price: Json<Vec<SizePrice>>,
    colors: Vec<String>,
    sizes: Vec<String>,
    gws: String,
    images: Vec<String>,
    stock: i32,
    sold: i32,
    avg_rating: Decimal,
    review_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            store_id: row.store_id,
            name: row.name,
            description: row.description,
            status: row.status,
            price: row.price.0,
            colors: row.colors,
            sizes: row.sizes,
            gws: row.gws,
            images: row.images,
            stock: row.stock,
            sold: row.sold,
            avg_rating: row.avg_rating,
            review_count: row.review_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Product details joined into other rows (see [`SUMMARY_COLUMNS`]).
#[derive(Debug, sqlx::FromRow)]
pub(super) struct SummaryRow {
    product_id: ProductId,
    store_id: StoreId,
    name: String,
    status: ProductStatus,
    price: Json<Vec<SizePrice>>,
    image: Option<String>,
    stock: i32,
}

impl From<SummaryRow> for ProductSummary {
    fn from(row: SummaryRow) -> Self {
        Self {
            id: row.product_id,
            store_id: row.store_id,
            name: row.name,
            status: row.status,
            price: row.price.0,
            image: row.image,
            stock: row.stock,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRefRow {
    order_id: OrderId,
    quantity: i32,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

/// Get a product by ID.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: ProductId,
) -> Result<Option<Product>, RepositoryError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM storefront.product p WHERE p.id = $1");
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(Product::from))
}

/// Get a product and lock its row for the rest of the transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock<'e>(
    executor: impl PgExecutor<'e>,
    id: ProductId,
) -> Result<Option<Product>, RepositoryError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM storefront.product p WHERE p.id = $1 FOR UPDATE OF p"
    );
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(Product::from))
}

/// List a store's products, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_by_store<'e>(
    executor: impl PgExecutor<'e>,
    store_id: StoreId,
) -> Result<Vec<Product>, RepositoryError> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM storefront.product p \
         WHERE p.store_id = $1 ORDER BY p.created_at DESC, p.id DESC"
    );
    let rows = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(store_id)
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(Product::from).collect())
}

/// Lock the stock of the given products, in ascending ID order.
///
/// Locking in a fixed order keeps two checkouts over overlapping products
/// from deadlocking. IDs that don't exist are simply absent from the result.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_stock<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[ProductId],
) -> Result<Vec<StockLevel>, RepositoryError> {
    let rows: Vec<(ProductId, i32)> = sqlx::query_as(
        r"
        SELECT id, stock
        FROM storefront.product
        WHERE id = ANY($1)
        ORDER BY id
        FOR UPDATE
        ",
    )
    .bind(ids)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, stock)| StockLevel { id, stock })
        .collect())
}

/// Move `quantity` units of a product from stock to sold.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product doesn't exist.
/// Returns `RepositoryError::Conflict` if stock would go negative.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn take_stock<'e>(
    executor: impl PgExecutor<'e>,
    id: ProductId,
    quantity: i32,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE storefront.product
        SET stock = stock - $2, sold = sold + $2, updated_at = now()
        WHERE id = $1
        ",
    )
    .bind(id)
    .bind(quantity)
    .execute(executor)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_check_violation()
        {
            return RepositoryError::Conflict(format!("insufficient stock for product {id}"));
        }
        RepositoryError::Database(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Insert a product for a store.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    store_id: StoreId,
    input: &NewProduct,
) -> Result<Product, RepositoryError> {
    let sql = format!(
        r"
        WITH p AS (
            INSERT INTO storefront.product
                (store_id, name, description, price, colors, sizes, gws, images, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
        )
        SELECT {PRODUCT_COLUMNS} FROM p
        "
    );
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(store_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(Json(&input.price))
        .bind(&input.colors)
        .bind(&input.sizes)
        .bind(&input.gws)
        .bind(&input.images)
        .bind(input.stock)
        .fetch_one(executor)
        .await?;

    Ok(row.into())
}

/// Write back the admin-editable fields of a product.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product doesn't exist.
/// Returns `RepositoryError::Database` if the update fails.
pub async fn save<'e>(executor: impl PgExecutor<'e>, product: &Product) -> Result<Product, RepositoryError> {
    let sql = format!(
        r"
        WITH p AS (
            UPDATE storefront.product
            SET price = $2, status = $3, description = $4, colors = $5, sizes = $6,
                gws = $7, stock = $8, images = $9, updated_at = now()
            WHERE id = $1
            RETURNING *
        )
        SELECT {PRODUCT_COLUMNS} FROM p
        "
    );
    let row = sqlx::query_as::<_, ProductRow>(&sql)
        .bind(product.id)
        .bind(Json(&product.price))
        .bind(product.status)
        .bind(&product.description)
        .bind(&product.colors)
        .bind(&product.sizes)
        .bind(&product.gws)
        .bind(product.stock)
        .bind(&product.images)
        .fetch_optional(executor)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    Ok(row.into())
}

/// Delete a product. Its reviews, cart entries and wishlist entries go with it.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product doesn't exist.
/// Returns `RepositoryError::Conflict` if an order line still references it.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: ProductId) -> Result<(), RepositoryError> {
    let result = sqlx::query("DELETE FROM storefront.product WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::Conflict("product has been ordered".to_owned());
            }
            RepositoryError::Database(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Number of order lines referencing a product.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn line_count<'e>(executor: impl PgExecutor<'e>, id: ProductId) -> Result<i64, RepositoryError> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT count(*) FROM storefront.order_line WHERE product_id = $1")
            .bind(id)
            .fetch_one(executor)
            .await?;

    Ok(count)
}

/// Recompute a product's average rating from its reviews, rounded to two
/// decimal places, or `0` when it has none.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product doesn't exist.
/// Returns `RepositoryError::Database` if the update fails.
pub async fn recompute_rating<'e>(
    executor: impl PgExecutor<'e>,
    id: ProductId,
) -> Result<Decimal, RepositoryError> {
    let row: Option<(Decimal,)> = sqlx::query_as(
        r"
        UPDATE storefront.product
        SET avg_rating = COALESCE(
                (SELECT round(avg(rating)::numeric, 2)
                 FROM storefront.review
                 WHERE product_id = $1),
                0),
            updated_at = now()
        WHERE id = $1
        RETURNING avg_rating
        ",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    row.map(|(avg,)| avg).ok_or(RepositoryError::NotFound)
}

/// The orders a product appears in, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn order_refs<'e>(
    executor: impl PgExecutor<'e>,
    id: ProductId,
) -> Result<Vec<ProductOrderRef>, RepositoryError> {
    let rows = sqlx::query_as::<_, OrderRefRow>(
        r"
        SELECT l.order_id, l.quantity, o.status, o.created_at
        FROM storefront.order_line l
        JOIN storefront.order o ON o.id = l.order_id
        WHERE l.product_id = $1
        ORDER BY o.created_at DESC, o.id DESC
        ",
    )
    .bind(id)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ProductOrderRef {
            order: r.order_id,
            quantity: r.quantity,
            status: r.status,
            created_at: r.created_at,
        })
        .collect())
}
