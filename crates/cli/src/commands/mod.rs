//! CLI command implementations.

pub mod import;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

/// Connect to the database named by the environment.
///
/// Uses `ORDERHUB_DATABASE_URL`, falling back to `DATABASE_URL`.
pub(crate) async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let url = std::env::var("ORDERHUB_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| "ORDERHUB_DATABASE_URL is not set")?;

    let pool = orderhub_api::db::create_pool(&SecretString::from(url)).await?;
    Ok(pool)
}
