//! Seed the storefront database with sample data.

use pearl_treasure_storefront::db::{self, PgPearlRepository};
use pearl_treasure_storefront::services::CatalogService;
use tracing::info;

use super::{CommandError, database_url};

/// Insert the sample pearls when the catalog is empty.
///
/// # Errors
///
/// Returns an error if the database URL is missing or a database
/// operation fails.
pub async fn catalog() -> Result<(), CommandError> {
    let database_url = database_url()?;

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let pearls = PgPearlRepository::new(pool);
    let inserted = CatalogService::new(&pearls).seed_sample_catalog().await?;

    if inserted == 0 {
        info!("Catalog already has pearls, nothing to seed");
    } else {
        info!(inserted, "Sample catalog seeded");
    }
    Ok(())
}
