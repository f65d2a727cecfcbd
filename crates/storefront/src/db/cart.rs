//! Database operations for shopper carts.

use rust_decimal::Decimal;
use sqlx::PgExecutor;

use mercato_core::{ProductId, UserId};

use super::RepositoryError;
use super::products::{SUMMARY_COLUMNS, SummaryRow};
use crate::models::cart::{Cart, CartEntry, CartLine};
use crate::models::product::ProductSummary;

#[derive(Debug, sqlx::FromRow)]
struct CartEntryRow {
    product_id: ProductId,
    color: String,
    size: String,
    sell_price: Decimal,
    quantity: i32,
}

impl From<CartEntryRow> for CartEntry {
    fn from(row: CartEntryRow) -> Self {
        Self {
            item: row.product_id,
            color: row.color,
            size: row.size,
            sell_price: row.sell_price,
            quantity: row.quantity,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    color: String,
    size: String,
    sell_price: Decimal,
    quantity: i32,
    #[sqlx(flatten)]
    product: SummaryRow,
}

/// Load a user's cart, in the order entries were added.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get<'e>(executor: impl PgExecutor<'e>, user_id: UserId) -> Result<Cart, RepositoryError> {
    let rows = sqlx::query_as::<_, CartEntryRow>(
        r"
        SELECT product_id, color, size, sell_price, quantity
        FROM storefront.cart_entry
        WHERE user_id = $1
        ORDER BY id
        ",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(Cart::new(rows.into_iter().map(CartEntry::from).collect()))
}

/// Load a user's cart with product details, in the order entries were added.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lines<'e>(
    executor: impl PgExecutor<'e>,
    user_id: UserId,
) -> Result<Vec<CartLine>, RepositoryError> {
    let sql = format!(
        r"
        SELECT c.color, c.size, c.sell_price, c.quantity, {SUMMARY_COLUMNS}
        FROM storefront.cart_entry c
        JOIN storefront.product p ON p.id = c.product_id
        WHERE c.user_id = $1
        ORDER BY c.id
        "
    );
    let rows = sqlx::query_as::<_, CartLineRow>(&sql)
        .bind(user_id)
        .fetch_all(executor)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let product: ProductSummary = row.product.into();
            CartLine {
                entry: CartEntry {
                    item: product.id,
                    color: row.color,
                    size: row.size,
                    sell_price: row.sell_price,
                    quantity: row.quantity,
                },
                product,
            }
        })
        .collect())
}

/// Add an entry to a user's cart.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the product is already in the cart
/// or doesn't exist.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    user_id: UserId,
    entry: &CartEntry,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO storefront.cart_entry (user_id, product_id, color, size, sell_price, quantity)
        VALUES ($1, $2, $3, $4, $5, $6)
        ",
    )
    .bind(user_id)
    .bind(entry.item)
    .bind(&entry.color)
    .bind(&entry.size)
    .bind(entry.sell_price)
    .bind(entry.quantity)
    .execute(executor)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return RepositoryError::Conflict("product already in cart".to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return RepositoryError::Conflict("product does not exist".to_owned());
            }
        }
        RepositoryError::Database(e)
    })?;

    Ok(())
}

/// Remove a product from a user's cart.
///
/// Returns `true` if an entry was removed.
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
        sqlx::query("DELETE FROM storefront.cart_entry WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(executor)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// Overwrite the stored fields of an existing cart entry.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product isn't in the cart.
/// Returns `RepositoryError::Database` if the update fails.
pub async fn save<'e>(
    executor: impl PgExecutor<'e>,
    user_id: UserId,
    entry: &CartEntry,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE storefront.cart_entry
        SET color = $3, size = $4, sell_price = $5, quantity = $6
        WHERE user_id = $1 AND product_id = $2
        ",
    )
    .bind(user_id)
    .bind(entry.item)
    .bind(&entry.color)
    .bind(&entry.size)
    .bind(entry.sell_price)
    .bind(entry.quantity)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}
