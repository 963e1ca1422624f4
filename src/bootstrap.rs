//! Startup seeding of sample rows for manual testing.

use tracing::info;

use crate::database::models::ProductDraft;
use crate::database::{ProductRepository, RepositoryError};
use crate::error::ApiError;
use crate::state::AppState;

/// Sample products: (name, price, quantity)
pub const SAMPLE_PRODUCTS: &[(&str, f64, i32)] = &[("Laptop", 1000.0, 10), ("Phone", 500.0, 20), ("Tablet", 300.0, 30)];

/// Inserts the sample products only into an empty store, so restarts against a
/// durable database never duplicate them. Returns the number inserted.
pub async fn seed_products(products: &dyn ProductRepository) -> Result<usize, RepositoryError> {
    let existing = products.count().await?;
    if existing > 0 {
        info!("Product store already has {} rows, skipping product seed", existing);
        return Ok(0);
    }

    for (name, price, quantity) in SAMPLE_PRODUCTS {
        let product = products.create(ProductDraft::new(*name, *price, *quantity)).await?;
        info!("Seeded product {:?}", product);
    }
    Ok(SAMPLE_PRODUCTS.len())
}

/// Runs every seed step enabled by configuration.
pub async fn run(state: &AppState) -> Result<(), ApiError> {
    if !state.config.seed.on_startup {
        info!("Startup seeding disabled");
        return Ok(());
    }

    seed_products(state.products.as_ref()).await?;
    if let Some(user_store) = &state.user_store {
        user_store
            .seed_default_users(state.config.security.password_hash_cost)
            .await?;
    }
    Ok(())
}
