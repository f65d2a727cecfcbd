//! Store dashboard service.

use sqlx::PgPool;
use tracing::instrument;

use crate::db;
use crate::error::AppError;
use crate::models::CurrentUser;
use crate::models::dashboard::DashboardMetrics;
use crate::services::require_store_admin;

/// Recomputes store metrics from live data.
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    /// Create a new dashboard service.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Metrics for the caller's store.
    ///
    /// Both tallies are read in one transaction so they describe the same
    /// moment.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` unless the caller administers a store.
    #[instrument(skip(self, user))]
    pub async fn metrics(&self, user: &CurrentUser) -> Result<DashboardMetrics, AppError> {
        let store = require_store_admin(user)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;
        let products = db::stores::product_tallies(&mut *tx, store).await?;
        let orders = db::stores::order_tallies(&mut *tx, store).await?;
        tx.commit().await?;

        Ok(DashboardMetrics::compute(&products, &orders))
    }
}
