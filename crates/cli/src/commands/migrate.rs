//! Database migration command.
//!
//! Migrations are embedded in the `orderhub-api` crate from
//! `crates/api/migrations/` and applied with sqlx's migrator, so the CLI
//! binary carries them without needing the source tree at runtime.

use tracing::info;

/// Run pending database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    info!("Running migrations...");
    orderhub_api::db::MIGRATOR.run(&pool).await?;
    info!("Migrations complete");

    Ok(())
}
