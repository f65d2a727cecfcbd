//! Demo data for local development.
//!
//! Inserts two stores, each with an admin and a handful of products, plus one
//! shopper account. Emails are fixed, so a second run fails with a conflict
//! instead of duplicating data.

use rust_decimal::Decimal;
use tracing::info;

use mercato_core::{SizePrice, UserRole};
use mercato_storefront::db::{self, products, stores, users};
use mercato_storefront::models::product::NewProduct;

use super::{CommandError, database_url};

struct DemoStore {
    name: &'static str,
    admin_email: &'static str,
    admin_name: &'static str,
    products: &'static [DemoProduct],
}

struct DemoProduct {
    name: &'static str,
    description: &'static str,
    /// (size, sell price in paise, MRP in paise)
    sizes: &'static [(&'static str, i64, i64)],
    colors: &'static [&'static str],
    stock: i32,
}

const DEMO_STORES: &[DemoStore] = &[
    DemoStore {
        name: "Loom & Thread",
        admin_email: "admin@loomandthread.test",
        admin_name: "Asha Rao",
        products: &[
            DemoProduct {
                name: "Handloom Cotton Kurta",
                description: "Breathable handwoven cotton.",
                sizes: &[("S", 129_900, 159_900), ("M", 129_900, 159_900), ("L", 139_900, 169_900)],
                colors: &["indigo", "ivory"],
                stock: 25,
            },
            DemoProduct {
                name: "Block Print Stole",
                description: "Hand block printed with natural dyes.",
                sizes: &[("Free", 59_900, 79_900)],
                colors: &["rust"],
                stock: 40,
            },
        ],
    },
    DemoStore {
        name: "Spice Route Pantry",
        admin_email: "admin@spiceroute.test",
        admin_name: "Karan Mehta",
        products: &[
            DemoProduct {
                name: "Kashmiri Chilli Powder",
                description: "Mild heat, deep colour.",
                sizes: &[("100g", 14_900, 17_900), ("250g", 32_900, 39_900)],
                colors: &[],
                stock: 120,
            },
            DemoProduct {
                name: "Single Estate Cardamom",
                description: "Green cardamom pods from Idukki.",
                sizes: &[("50g", 24_900, 29_900)],
                colors: &[],
                stock: 3,
            },
        ],
    },
];

const DEMO_SHOPPER: (&str, &str) = ("shopper@mercato.test", "Demo Shopper");

fn new_product(demo: &DemoProduct) -> Result<NewProduct, CommandError> {
    let price = demo
        .sizes
        .iter()
        .map(|&(size, sell, mrp)| SizePrice::new(size, Decimal::new(sell, 2), Decimal::new(mrp, 2)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NewProduct {
        name: demo.name.to_owned(),
        description: demo.description.to_owned(),
        sizes: price.iter().map(|p| p.size.clone()).collect(),
        price,
        colors: demo.colors.iter().map(|&c| c.to_owned()).collect(),
        gws: String::new(),
        images: Vec::new(),
        stock: demo.stock,
    })
}

/// Seed the demo marketplace in a single transaction.
///
/// # Errors
///
/// Returns an error if the URL is missing, the connection fails, or the demo
/// data has already been seeded.
pub async fn demo() -> Result<(), CommandError> {
    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;
    let mut tx = pool.begin().await?;

    for demo_store in DEMO_STORES {
        let store = stores::create(&mut *tx, demo_store.name).await?;
        let admin = users::create(
            &mut *tx,
            &users::CreateUser {
                email: demo_store.admin_email.to_owned(),
                name: demo_store.admin_name.to_owned(),
                role: UserRole::Admin,
                store_id: Some(store.id),
            },
        )
        .await?;
        stores::set_owner(&mut *tx, store.id, admin.id).await?;

        for demo_product in demo_store.products {
            let product = products::insert(&mut *tx, store.id, &new_product(demo_product)?).await?;
            info!(store = %store.name, product_id = %product.id, name = %product.name, "Seeded product");
        }
        info!(store_id = %store.id, admin = %admin.email, "Seeded store");
    }

    let (email, name) = DEMO_SHOPPER;
    let shopper = users::create(
        &mut *tx,
        &users::CreateUser {
            email: email.to_owned(),
            name: name.to_owned(),
            role: UserRole::Customer,
            store_id: None,
        },
    )
    .await?;
    info!(user_id = %shopper.id, email = %shopper.email, "Seeded shopper");

    tx.commit().await?;
    info!("Demo data seeded");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_products_are_valid() {
        for store in DEMO_STORES {
            for product in store.products {
                let new = new_product(product).unwrap();
                assert_eq!(new.sizes.len(), new.price.len());
                assert!(new.stock >= 0);
            }
        }
    }

    #[test]
    fn test_demo_prices_are_in_rupees() {
        let new = new_product(&DEMO_STORES[0].products[0]).unwrap();
        assert_eq!(new.price[0].sell_price, Decimal::new(129_900, 2));
        assert_eq!(new.price[0].sell_price.to_string(), "1299.00");
    }
}
