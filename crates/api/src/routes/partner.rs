//! Partner (shop account) route handlers.
//!
//! All partner routes require a shop account; buyers get `403`.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::db::{CatalogRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireShop;
use crate::models::OrderView;
use crate::services::import::{fetch_price_list, parse_price_list};
use crate::state::AppState;

/// Price-list source: inline YAML or a URL to fetch it from.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    url: Option<String>,
    data: Option<String>,
}

/// A boolean that clients may send as a bool or a string flag.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum FlexibleBool {
    Bool(bool),
    Str(#[serde(deserialize_with = "de_bool_string")] bool),
}

fn de_bool_string<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid boolean flag: {other}"
        ))),
    }
}

impl FlexibleBool {
    const fn get(self) -> bool {
        match self {
            Self::Bool(v) | Self::Str(v) => v,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StateRequest {
    state: FlexibleBool,
}

/// `POST /partner/update` - replace the shop's catalog from a price list.
pub async fn update_catalog(
    State(state): State<AppState>,
    RequireShop(user): RequireShop,
    Json(request): Json<ImportRequest>,
) -> Result<Json<Value>> {
    let list = match (request.data, request.url) {
        (Some(yaml), _) => parse_price_list(&yaml)?,
        (None, Some(url)) => fetch_price_list(&url).await?,
        (None, None) => {
            return Err(AppError::Validation(
                "either data or url is required".to_owned(),
            ));
        }
    };

    let stats = CatalogRepository::new(state.pool())
        .replace_shop_listings(user.id, &list)
        .await?;

    tracing::info!(
        user_id = %user.id,
        shop = %list.shop,
        products = stats.products_imported,
        "price list imported"
    );

    Ok(Json(json!({
        "status": true,
        "categories_processed": stats.categories_processed,
        "products_imported": stats.products_imported,
    })))
}

/// `GET /partner/state` - the shop bound to the caller.
pub async fn get_state(
    State(state): State<AppState>,
    RequireShop(user): RequireShop,
) -> Result<Json<Value>> {
    let shop = CatalogRepository::new(state.pool())
        .get_shop_by_user(user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(json!({
        "status": true,
        "shop": shop,
    })))
}

/// `POST /partner/state` - toggle whether the shop accepts orders.
pub async fn set_state(
    State(state): State<AppState>,
    RequireShop(user): RequireShop,
    Json(request): Json<StateRequest>,
) -> Result<Json<Value>> {
    CatalogRepository::new(state.pool())
        .set_accepting_orders(user.id, request.state.get())
        .await?;

    Ok(Json(json!({ "status": true })))
}

/// `GET /partner/orders` - placed orders containing the shop's listings.
pub async fn orders(
    State(state): State<AppState>,
    RequireShop(user): RequireShop,
) -> Result<Json<Vec<OrderView>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_partner(user.id)
        .await?;
    Ok(Json(orders))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_request_bool() {
        let request: StateRequest = serde_json::from_str(r#"{"state": true}"#).expect("decode");
        assert!(request.state.get());
    }

    #[test]
    fn test_state_request_string_flags() {
        for (raw, expected) in [("on", true), ("off", false), ("True", true), ("0", false)] {
            let request: StateRequest =
                serde_json::from_str(&format!(r#"{{"state": "{raw}"}}"#)).expect("decode");
            assert_eq!(request.state.get(), expected, "flag {raw}");
        }
    }

    #[test]
    fn test_state_request_rejects_garbage() {
        assert!(serde_json::from_str::<StateRequest>(r#"{"state": "maybe"}"#).is_err());
    }

    #[test]
    fn test_import_request_shapes() {
        let inline: ImportRequest =
            serde_json::from_str(r#"{"data": "shop: X"}"#).expect("decode");
        assert!(inline.data.is_some());

        let by_url: ImportRequest =
            serde_json::from_str(r#"{"url": "https://example.com/p.yaml"}"#).expect("decode");
        assert!(by_url.url.is_some());
    }
}
