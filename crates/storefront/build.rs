//! Build script for storefront crate.
//!
//! `sqlx::migrate!` embeds the SQL files at compile time, so the crate must be
//! rebuilt whenever a migration is added or edited.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
