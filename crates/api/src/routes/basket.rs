//! Basket route handlers.
//!
//! Mutation payloads accept an `items` field in three shapes for client
//! compatibility: a JSON array, a single object, or a JSON-encoded string
//! containing either. Deletion takes a comma-separated id string or an
//! array of ids.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use orderhub_core::OrderItemId;

use crate::db::BasketRepository;
use crate::db::baskets::{LineItemInput, QuantityInput};
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::BasketView;
use crate::state::AppState;

/// The `items` field of a basket mutation, in any of its accepted shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemsField<T> {
    Many(Vec<T>),
    One(T),
    /// A JSON document nested inside a string.
    Encoded(String),
}

impl<T: DeserializeOwned> ItemsField<T> {
    fn into_vec(self) -> Result<Vec<T>> {
        match self {
            Self::Many(items) => Ok(items),
            Self::One(item) => Ok(vec![item]),
            Self::Encoded(raw) => serde_json::from_str::<Self>(&raw)
                .map_err(|e| AppError::Validation(format!("invalid items payload: {e}")))?
                .into_vec(),
        }
    }
}

/// Item ids for deletion: `"1,2,3"` or `[1, 2, 3]`. Non-numeric tokens in
/// the string form are silently skipped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IdList {
    Many(Vec<i32>),
    Csv(String),
}

impl IdList {
    pub(crate) fn into_vec(self) -> Vec<i32> {
        match self {
            Self::Many(ids) => ids,
            Self::Csv(raw) => raw
                .split(',')
                .filter_map(|s| s.trim().parse::<i32>().ok())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemsRequest {
    items: ItemsField<LineItemInput>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemsRequest {
    items: ItemsField<QuantityInput>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemsRequest {
    items: IdList,
}

/// `GET /basket` - the caller's basket with items and total.
pub async fn show(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<BasketView>> {
    let basket = BasketRepository::new(state.pool()).get_basket(user.id).await?;
    Ok(Json(basket))
}

/// `POST /basket` - add items; all-or-nothing.
pub async fn add(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<AddItemsRequest>,
) -> Result<Json<Value>> {
    let items = request.items.into_vec()?;
    if items.is_empty() {
        return Err(AppError::Validation("items is empty".to_owned()));
    }

    let outcome = BasketRepository::new(state.pool())
        .add_items(user.id, &items)
        .await?;

    Ok(Json(json!({
        "status": true,
        "created": outcome.created,
        "updated": outcome.updated,
    })))
}

/// `PUT /basket` - set quantities; zero or negative removes the item.
/// All-or-nothing like `POST`.
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<UpdateItemsRequest>,
) -> Result<Json<Value>> {
    let items = request.items.into_vec()?;
    if items.is_empty() {
        return Err(AppError::Validation("items is empty".to_owned()));
    }

    let outcome = BasketRepository::new(state.pool())
        .update_items(user.id, &items)
        .await?;

    Ok(Json(json!({
        "status": true,
        "updated": outcome.updated,
        "deleted": outcome.deleted,
    })))
}

/// `DELETE /basket` - remove items by id; unknown ids are ignored.
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<RemoveItemsRequest>,
) -> Result<Json<Value>> {
    let ids: Vec<OrderItemId> = request
        .items
        .into_vec()
        .into_iter()
        .map(OrderItemId::new)
        .collect();

    if ids.is_empty() {
        return Err(AppError::Validation("items is empty".to_owned()));
    }

    let deleted = BasketRepository::new(state.pool())
        .remove_items(user.id, &ids)
        .await?;

    Ok(Json(json!({ "status": true, "deleted": deleted })))
}
