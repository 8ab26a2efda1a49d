//! Public catalog route handlers.
//!
//! Browsing is open; only listings of shops accepting orders are visible.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use orderhub_core::{CategoryId, ShopId};

use crate::db::CatalogRepository;
use crate::error::Result;
use crate::models::{Category, ListingView, Shop};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    shop_id: Option<ShopId>,
    category_id: Option<CategoryId>,
}

/// `GET /shops` - shops currently accepting orders.
pub async fn shops(State(state): State<AppState>) -> Result<Json<Vec<Shop>>> {
    let shops = CatalogRepository::new(state.pool()).list_shops().await?;
    Ok(Json(shops))
}

/// `GET /categories` - all categories.
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CatalogRepository::new(state.pool()).list_categories().await?;
    Ok(Json(categories))
}

/// `GET /products` - listing search, optionally filtered by shop and
/// category.
pub async fn products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ListingView>>> {
    let listings = CatalogRepository::new(state.pool())
        .search_listings(params.shop_id, params.category_id)
        .await?;
    Ok(Json(listings))
}
