//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! mercato-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migration files live in `crates/storefront/migrations/` and are embedded
//! into the binary at build time.

use mercato_storefront::db;

use super::{CommandError, database_url};

/// Run the storefront database migrations.
///
/// # Errors
///
/// Returns an error if the URL is missing, the connection fails, or a
/// migration fails to apply.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running storefront migrations...");
    db::MIGRATOR.run(&pool).await?;

    tracing::info!("Storefront migrations complete");
    Ok(())
}
