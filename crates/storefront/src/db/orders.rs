//! Database operations for orders and their line items.
//!
//! Line items are aggregated into the order row as JSON so an order, its
//! customer and its lines come back from a single query.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgExecutor;
use sqlx::types::Json;

use mercato_core::{OrderId, OrderStatus, ProductId, StoreId, UserId};

use super::RepositoryError;
use crate::models::order::{
    NewOrder, Order, OrderDetail, OrderLine, OrderLineDetail, PaymentConfirmation,
    ShippingAddress,
};
use crate::models::user::UserSummary;

const ORDER_COLUMNS: &str = r"
    o.id, o.customer_id, o.status, o.amount, o.delivery_charge, o.cod, o.delivery_date,
    o.shipping_address, o.payment_provider, o.payment_reference, o.created_at, o.updated_at
";

const DETAIL_SELECT: &str = r"
    SELECT
        o.id, o.customer_id, o.status, o.amount, o.delivery_charge, o.cod, o.delivery_date,
        o.shipping_address, o.payment_provider, o.payment_reference, o.created_at, o.updated_at,
        u.name AS customer_name,
        u.email AS customer_email,
        COALESCE((
            SELECT jsonb_agg(jsonb_build_object(
                       'item', l.product_id,
                       'store_id', p.store_id,
                       'name', p.name,
                       'image', p.images[1],
                       'quantity', l.quantity
                   ) ORDER BY l.position)
            FROM storefront.order_line l
            JOIN storefront.product p ON p.id = l.product_id
            WHERE l.order_id = o.id
        ), '[]'::jsonb) AS lines
    FROM storefront.order o
    JOIN storefront.user u ON u.id = o.customer_id
";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    customer_id: UserId,
    status: OrderStatus,
    amount: Decimal,
    delivery_charge: Decimal,
    cod: bool,
    delivery_date: String,
    shipping_address: Json<ShippingAddress>,
    payment_provider: Option<String>,
    payment_reference: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        let payment = match (row.payment_provider, row.payment_reference) {
            (Some(provider), Some(reference)) => Some(PaymentConfirmation { provider, reference }),
            _ => None,
        };
        Self {
            id: row.id,
            customer_id: row.customer_id,
            status: row.status,
            amount: row.amount,
            delivery_charge: row.delivery_charge,
            cod: row.cod,
            delivery_date: row.delivery_date,
            shipping_address: row.shipping_address.0,
            payment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LineJson {
    item: ProductId,
    store_id: StoreId,
    name: String,
    image: Option<String>,
    quantity: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderDetailRow {
    #[sqlx(flatten)]
    order: OrderRow,
    customer_name: String,
    customer_email: String,
    lines: Json<Vec<LineJson>>,
}

impl From<OrderDetailRow> for OrderDetail {
    fn from(row: OrderDetailRow) -> Self {
        let order = Order::from(row.order);
        Self {
            customer: UserSummary {
                id: order.customer_id,
                name: row.customer_name,
                email: row.customer_email,
            },
            products: row
                .lines
                .0
                .into_iter()
                .map(|l| OrderLineDetail {
                    item: l.item,
                    store_id: l.store_id,
                    name: l.name,
                    image: l.image,
                    quantity: l.quantity,
                })
                .collect(),
            order,
        }
    }
}

/// Insert an order header.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert<'e>(
    executor: impl PgExecutor<'e>,
    customer_id: UserId,
    input: &NewOrder,
    delivery_date: &str,
) -> Result<Order, RepositoryError> {
    let (provider, reference) = input
        .payment
        .as_ref()
        .map(|p| (p.provider.as_str(), p.reference.as_str()))
        .unzip();

    let sql = format!(
        r"
        INSERT INTO storefront.order AS o
            (customer_id, amount, delivery_charge, cod, delivery_date, shipping_address,
             payment_provider, payment_reference)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {ORDER_COLUMNS}
        "
    );
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(customer_id)
        .bind(input.amount)
        .bind(input.delivery_charge)
        .bind(input.cod)
        .bind(delivery_date)
        .bind(Json(&input.shipping_address))
        .bind(provider)
        .bind(reference)
        .fetch_one(executor)
        .await?;

    Ok(row.into())
}

/// Insert an order's line items, keeping their submitted order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_lines<'e>(
    executor: impl PgExecutor<'e>,
    order_id: OrderId,
    lines: &[OrderLine],
) -> Result<(), RepositoryError> {
    let (items, quantities): (Vec<ProductId>, Vec<i32>) =
        lines.iter().map(|l| (l.item, l.quantity)).unzip();

    sqlx::query(
        r"
        INSERT INTO storefront.order_line (order_id, position, product_id, quantity)
        SELECT $1, t.position::int, t.product_id, t.quantity
        FROM UNNEST($2::int[], $3::int[]) WITH ORDINALITY AS t(product_id, quantity, position)
        ",
    )
    .bind(order_id)
    .bind(items)
    .bind(quantities)
    .execute(executor)
    .await?;

    Ok(())
}

/// Get an order with its customer and all of its lines.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_detail<'e>(
    executor: impl PgExecutor<'e>,
    id: OrderId,
) -> Result<Option<OrderDetail>, RepositoryError> {
    let sql = format!("{DETAIL_SELECT} WHERE o.id = $1");
    let row = sqlx::query_as::<_, OrderDetailRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(OrderDetail::from))
}

/// List a customer's orders, newest first.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_for_customer<'e>(
    executor: impl PgExecutor<'e>,
    customer_id: UserId,
) -> Result<Vec<OrderDetail>, RepositoryError> {
    let sql = format!("{DETAIL_SELECT} WHERE o.customer_id = $1 ORDER BY o.created_at DESC, o.id DESC");
    let rows = sqlx::query_as::<_, OrderDetailRow>(&sql)
        .bind(customer_id)
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(OrderDetail::from).collect())
}

/// List the orders holding at least one of a store's products, newest first.
///
/// Lines from every store are returned; narrowing to the store's own lines is
/// left to [`OrderDetail::for_store`].
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_for_store<'e>(
    executor: impl PgExecutor<'e>,
    store_id: StoreId,
) -> Result<Vec<OrderDetail>, RepositoryError> {
    let sql = format!(
        r"
        {DETAIL_SELECT}
        WHERE EXISTS (
            SELECT 1
            FROM storefront.order_line sl
            JOIN storefront.product sp ON sp.id = sl.product_id
            WHERE sl.order_id = o.id AND sp.store_id = $1
        )
        ORDER BY o.created_at DESC, o.id DESC
        "
    );
    let rows = sqlx::query_as::<_, OrderDetailRow>(&sql)
        .bind(store_id)
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(OrderDetail::from).collect())
}

/// Get an order header and lock its row for the rest of the transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock<'e>(
    executor: impl PgExecutor<'e>,
    id: OrderId,
) -> Result<Option<Order>, RepositoryError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM storefront.order o WHERE o.id = $1 FOR UPDATE");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(Order::from))
}

/// Stores with at least one line in an order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn stores<'e>(
    executor: impl PgExecutor<'e>,
    id: OrderId,
) -> Result<Vec<StoreId>, RepositoryError> {
    let rows: Vec<(StoreId,)> = sqlx::query_as(
        r"
        SELECT DISTINCT p.store_id
        FROM storefront.order_line l
        JOIN storefront.product p ON p.id = l.product_id
        WHERE l.order_id = $1
        ORDER BY p.store_id
        ",
    )
    .bind(id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(|(s,)| s).collect())
}

/// Set an order's status.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order doesn't exist.
/// Returns `RepositoryError::Database` if the update fails.
pub async fn set_status<'e>(
    executor: impl PgExecutor<'e>,
    id: OrderId,
    status: OrderStatus,
) -> Result<Order, RepositoryError> {
    let sql = format!(
        r"
        UPDATE storefront.order AS o
        SET status = $2, updated_at = now()
        WHERE o.id = $1
        RETURNING {ORDER_COLUMNS}
        "
    );
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    Ok(row.into())
}
