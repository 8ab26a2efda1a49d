//! Database access for the OrderHub `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `users`, `auth_tokens` - accounts and the tokens the auth extractor
//!   resolves (token issuance is external)
//! - `shops`, `categories`, `shop_categories`, `products`, `listings`,
//!   `listing_parameters` - the catalog, replaced per shop by the importer
//! - `orders`, `order_items` - baskets and placed orders
//! - `contacts` - delivery contacts
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p orderhub-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod baskets;
pub mod catalog;
pub mod contacts;
pub mod orders;
pub mod users;

pub use baskets::{BasketError, BasketRepository};
pub use catalog::CatalogRepository;
pub use contacts::ContactRepository;
pub use orders::{OrderError, OrderRepository};
pub use users::UserRepository;

/// Embedded SQL migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The requested row does not exist or is not owned by the caller.
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value failed to parse back into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
