//! Order lifecycle service.
//!
//! Checkout writes the order, its lines and the stock/sold counters of every
//! product in one transaction. The product rows are locked in ascending id
//! order first, so the stock check and the decrement see the same values.

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, instrument};

use mercato_core::{OrderId, ProductId};

use crate::db;
use crate::error::{AppError, Entity};
use crate::models::order::{
    CheckoutRequest, Order, OrderDetail, UpdateStatusRequest, delivery_date, reserve_stock,
};
use crate::models::{CurrentUser, require};
use crate::services::require_store_admin;

/// Order operations for shoppers and store admins.
pub struct OrderService {
    pool: PgPool,
    delivery_days: u32,
}

impl OrderService {
    /// Create a new order service.
    ///
    /// `delivery_days` is added to the placement date to promise delivery.
    #[must_use]
    pub const fn new(pool: PgPool, delivery_days: u32) -> Self {
        Self {
            pool,
            delivery_days,
        }
    }

    /// Place an order for the caller.
    ///
    /// # Errors
    ///
    /// Returns `MissingField`/`InvalidField` for a malformed checkout,
    /// `ProductNotFound` unless every line resolves to a distinct product,
    /// and `OutOfStock` if a product has fewer units than requested. No rows
    /// are written in any of these cases.
    #[instrument(skip(self, user, request), fields(customer_id = %user.id))]
    pub async fn create_order(
        &self,
        user: &CurrentUser,
        request: CheckoutRequest,
    ) -> Result<OrderDetail, AppError> {
        let input = request.validate()?;

        let mut ids: Vec<ProductId> = input.lines.iter().map(|l| l.item).collect();
        ids.sort_unstable();
        ids.dedup();

        let mut tx = self.pool.begin().await?;

        let levels = db::products::lock_stock(&mut *tx, &ids).await?;
        let reserved = reserve_stock(&input.lines, &levels)?;

        let promised = delivery_date(Utc::now().date_naive(), self.delivery_days);
        let order = db::orders::insert(&mut *tx, user.id, &input, &promised).await?;
        db::orders::insert_lines(&mut *tx, order.id, &input.lines).await?;
        for (product_id, quantity) in reserved {
            db::products::take_stock(&mut *tx, product_id, quantity).await?;
        }

        let detail = db::orders::get_detail(&mut *tx, order.id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("order {} vanished after insert", order.id)))?;
        tx.commit().await?;

        info!(
            order_id = %order.id,
            lines = detail.products.len(),
            stores = detail.stores().len(),
            "Order placed"
        );
        Ok(detail)
    }

    /// Move an order to a new status on behalf of a store admin.
    ///
    /// Any status may follow any other except that a cancelled order never
    /// changes again. The admin's store must own at least one of the order's
    /// lines.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied`, `NotFound(Order)`, `MissingField("status")`, or
    /// `InvalidTransition` ("Order already cancelled").
    #[instrument(skip(self, user, request), fields(order_id = %order_id))]
    pub async fn update_status(
        &self,
        user: &CurrentUser,
        order_id: OrderId,
        request: UpdateStatusRequest,
    ) -> Result<Order, AppError> {
        let store = require_store_admin(user)?;
        let requested = require(request.status, "status")?;

        let mut tx = self.pool.begin().await?;
        let order = db::orders::lock(&mut *tx, order_id)
            .await?
            .ok_or(AppError::NotFound(Entity::Order))?;

        let stores = db::orders::stores(&mut *tx, order_id).await?;
        if !stores.contains(&store) {
            return Err(AppError::AccessDenied);
        }

        let next = order.status.transition_to(requested)?;
        let updated = db::orders::set_status(&mut *tx, order_id, next).await?;
        tx.commit().await?;

        info!(from = %order.status, to = %next, "Order status changed");
        Ok(updated)
    }

    /// The admin's store view of its orders: every order holding at least one
    /// of the store's products, with only that store's lines.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` unless the caller administers a store.
    #[instrument(skip(self, user))]
    pub async fn store_orders(&self, user: &CurrentUser) -> Result<Vec<OrderDetail>, AppError> {
        let store = require_store_admin(user)?;
        let orders = db::orders::list_for_store(&self.pool, store).await?;

        Ok(orders
            .into_iter()
            .map(|order| order.for_store(store))
            .collect())
    }

    /// The caller's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    #[instrument(skip(self, user), fields(customer_id = %user.id))]
    pub async fn customer_orders(&self, user: &CurrentUser) -> Result<Vec<OrderDetail>, AppError> {
        Ok(db::orders::list_for_customer(&self.pool, user.id).await?)
    }

    /// One of the caller's own orders.
    ///
    /// # Errors
    ///
    /// Returns `NotFound(Order)` if the order doesn't exist or belongs to
    /// someone else.
    #[instrument(skip(self, user), fields(customer_id = %user.id, order_id = %order_id))]
    pub async fn customer_order(
        &self,
        user: &CurrentUser,
        order_id: OrderId,
    ) -> Result<OrderDetail, AppError> {
        db::orders::get_detail(&self.pool, order_id)
            .await?
            .filter(|detail| detail.order.customer_id == user.id)
            .ok_or(AppError::NotFound(Entity::Order))
    }
}
