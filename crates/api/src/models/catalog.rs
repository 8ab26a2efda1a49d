//! Catalog entities: shops, categories, products, and per-shop listings.
//!
//! The catalog is read-mostly input for the basket and order flows. It is
//! replaced wholesale per shop by the price-list importer
//! (`services::import`); the only other writers are order placement
//! (stock decrement) and cancellation (stock increment).

use rust_decimal::Decimal;
use serde::Serialize;

use orderhub_core::{CategoryId, ListingId, ProductId, ShopId, UserId};

/// A shop partner offering listings.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub url: Option<String>,
    pub user_id: Option<UserId>,
    /// Whether the shop currently accepts new orders. Listings of a
    /// non-accepting shop are hidden from search.
    pub accepting_orders: bool,
}

/// A product category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A product, shared across shops.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category_id: CategoryId,
}

/// A shop's sellable instance of a product with its own price and stock.
///
/// Invariant: `quantity >= 0` at all times (also enforced by a database
/// CHECK constraint).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Listing {
    pub id: ListingId,
    pub product_id: ProductId,
    pub shop_id: ShopId,
    pub external_id: i32,
    pub model: String,
    pub price: Decimal,
    pub price_rrc: Decimal,
    pub quantity: i32,
}

/// A named parameter attached to a listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ListingParameter {
    pub name: String,
    pub value: String,
}

/// A listing as returned by catalog search, with names resolved and
/// parameters embedded.
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub id: ListingId,
    pub product: String,
    pub category: String,
    pub shop: String,
    pub model: String,
    pub external_id: i32,
    pub price: Decimal,
    pub price_rrc: Decimal,
    pub quantity: i32,
    pub parameters: Vec<ListingParameter>,
}
