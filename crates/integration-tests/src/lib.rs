//! Integration test support for Mercato.
//!
//! # Running Tests
//!
//! ```bash
//! # Router tests need no database
//! cargo test -p mercato-integration-tests
//!
//! # Database lifecycle tests create a scratch database per test
//! DATABASE_URL=postgres://localhost/mercato cargo test -p mercato-integration-tests -- --ignored
//! ```
//!
//! The fixtures below write straight through the storefront's `db` layer so
//! each test starts from a known marketplace without going through HTTP.

use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;

use mercato_core::{ProductId, SizePrice, StoreId, UserRole};
use mercato_storefront::config::{SentryConfig, StorefrontConfig};
use mercato_storefront::db::{self, RepositoryError};
use mercato_storefront::models::order::{CheckoutLineRequest, CheckoutRequest, ShippingAddress};
use mercato_storefront::models::product::NewProduct;
use mercato_storefront::models::session::CurrentUser;

/// Configuration pointing at a local database that is never dialled eagerly.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/mercato_test"),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        delivery_days: 5,
        assets: None,
        sentry: SentryConfig::default(),
    }
}

/// Create a store and its admin, returning the admin's identity.
///
/// # Errors
///
/// Returns `RepositoryError` if any insert fails.
pub async fn seed_store(pool: &PgPool, name: &str) -> Result<CurrentUser, RepositoryError> {
    let mut tx = pool.begin().await?;
    let store = db::stores::create(&mut *tx, name).await?;
    let admin = db::users::create(
        &mut *tx,
        &db::users::CreateUser {
            email: format!("admin-{}@mercato.test", store.id),
            name: format!("{name} Admin"),
            role: UserRole::Admin,
            store_id: Some(store.id),
        },
    )
    .await?;
    db::stores::set_owner(&mut *tx, store.id, admin.id).await?;
    tx.commit().await?;

    Ok(CurrentUser::store_admin(admin.id, store.id))
}

/// Create a shopper account.
///
/// # Errors
///
/// Returns `RepositoryError` if the insert fails.
pub async fn seed_customer(pool: &PgPool, email: &str) -> Result<CurrentUser, RepositoryError> {
    let user = db::users::create(
        pool,
        &db::users::CreateUser {
            email: email.to_string(),
            name: "Test Shopper".to_string(),
            role: UserRole::Customer,
            store_id: None,
        },
    )
    .await?;
    Ok(CurrentUser::customer(user.id))
}

/// Create a one-size product with the given stock.
///
/// # Errors
///
/// Returns `RepositoryError` if the insert fails.
pub async fn seed_product(
    pool: &PgPool,
    store_id: StoreId,
    name: &str,
    stock: i32,
) -> Result<ProductId, RepositoryError> {
    let product = db::products::insert(
        pool,
        store_id,
        &NewProduct {
            name: name.to_string(),
            description: String::new(),
            price: vec![SizePrice {
                size: "M".to_string(),
                sell_price: Decimal::new(49_900, 2),
                mrp: Decimal::new(59_900, 2),
            }],
            colors: Vec::new(),
            sizes: vec!["M".to_string()],
            gws: String::new(),
            images: Vec::new(),
            stock,
        },
    )
    .await?;
    Ok(product.id)
}

/// A cash-on-delivery checkout for the given lines.
#[must_use]
pub fn cod_checkout(lines: &[(ProductId, i32)], amount: Decimal, delivery_charge: Decimal) -> CheckoutRequest {
    CheckoutRequest {
        products: Some(
            lines
                .iter()
                .map(|&(item, quantity)| CheckoutLineRequest {
                    item: Some(item),
                    quantity: Some(quantity),
                })
                .collect(),
        ),
        shipping_address: Some(ShippingAddress {
            full_name: "Test Shopper".to_string(),
            phone: "5550100".to_string(),
            line1: "12 Market Road".to_string(),
            line2: None,
            city: "Pune".to_string(),
            region: "MH".to_string(),
            postal_code: "411001".to_string(),
            country: "IN".to_string(),
        }),
        cod: Some(true),
        amount: Some(amount),
        delivery_charge: Some(delivery_charge),
        payment: None,
    }
}
