//! Price-list import command.
//!
//! Parses a YAML price list from disk and loads it as the given shop user's
//! catalog, same path the `POST /api/v1/partner/update` route takes.

use orderhub_core::UserId;
use tracing::info;

use orderhub_api::db::CatalogRepository;
use orderhub_api::services::import::parse_price_list;

/// Import a price list file for a shop user.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the document is invalid, or
/// the database rejects the import.
pub async fn run(file: &str, user_id: i32) -> Result<(), Box<dyn std::error::Error>> {
    let yaml = std::fs::read_to_string(file)?;
    let list = parse_price_list(&yaml)?;

    let pool = super::connect().await?;
    let stats = CatalogRepository::new(&pool)
        .replace_shop_listings(UserId::new(user_id), &list)
        .await?;

    info!(
        shop = %list.shop,
        categories = stats.categories_processed,
        products = stats.products_imported,
        "price list imported"
    );

    Ok(())
}
