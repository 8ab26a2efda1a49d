//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use orderhub_core::{ContactId, OrderId, OrderState};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::OrderView;
use crate::state::AppState;

/// An id that clients may send as a number or a numeric string.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum FlexibleId {
    Int(i32),
    Str(#[serde(deserialize_with = "de_numeric_string")] i32),
}

fn de_numeric_string<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.trim().parse::<i32>().map_err(serde::de::Error::custom)
}

impl FlexibleId {
    const fn get(self) -> i32 {
        match self {
            Self::Int(v) | Self::Str(v) => v,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    /// Basket to place; defaults to the caller's open basket.
    id: Option<FlexibleId>,
    /// Delivery contact id.
    contact: FlexibleId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    contact: FlexibleId,
}

/// `GET /orders` - the caller's placed orders, newest first.
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<OrderView>>> {
    let orders = OrderRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(orders))
}

/// `POST /orders` - place the basket as an order.
///
/// Stock is checked and decremented atomically; on shortage the response
/// lists every unavailable item and nothing changes.
pub async fn place(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<Json<Value>> {
    let basket_id = request.id.map(|id| OrderId::new(id.get()));
    let contact_id = ContactId::new(request.contact.get());

    let placed = OrderRepository::new(state.pool())
        .place(user.id, basket_id, contact_id)
        .await?;

    state.notifier().order_placed(placed.id, &user.email, placed.total);

    Ok(Json(json!({
        "status": true,
        "id": placed.id,
        "total": placed.total,
    })))
}

/// `PUT /orders/{id}` - change the delivery contact of a `new` order.
pub async fn update_contact(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(order_id): Path<OrderId>,
    Json(request): Json<UpdateContactRequest>,
) -> Result<Json<Value>> {
    let contact_id = ContactId::new(request.contact.get());

    OrderRepository::new(state.pool())
        .update_contact(user.id, order_id, contact_id)
        .await?;

    Ok(Json(json!({ "status": true })))
}

/// `DELETE /orders/{id}` - cancel a `new` order and restore stock.
pub async fn cancel(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(order_id): Path<OrderId>,
) -> Result<Json<Value>> {
    let repo = OrderRepository::new(state.pool());

    // Confirm the order is the caller's before touching it; a missing row
    // and someone else's row answer the same way.
    let state_before = repo
        .get_state(user.id, order_id)
        .await?
        .ok_or(AppError::NotFound)?;

    repo.cancel(user.id, order_id).await?;

    state
        .notifier()
        .order_status_changed(order_id, &user.email, state_before, OrderState::Canceled);

    Ok(Json(json!({ "status": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_request_numeric_ids() {
        let request: PlaceOrderRequest =
            serde_json::from_str(r#"{"id": 3, "contact": 7}"#).expect("decode");
        assert_eq!(request.id.map(FlexibleId::get), Some(3));
        assert_eq!(request.contact.get(), 7);
    }

    #[test]
    fn test_place_request_string_ids() {
        let request: PlaceOrderRequest =
            serde_json::from_str(r#"{"id": "3", "contact": " 7 "}"#).expect("decode");
        assert_eq!(request.id.map(FlexibleId::get), Some(3));
        assert_eq!(request.contact.get(), 7);
    }

    #[test]
    fn test_place_request_default_basket() {
        let request: PlaceOrderRequest =
            serde_json::from_str(r#"{"contact": 7}"#).expect("decode");
        assert!(request.id.is_none());
    }

    #[test]
    fn test_place_request_rejects_non_numeric_contact() {
        assert!(serde_json::from_str::<PlaceOrderRequest>(r#"{"contact": "seven"}"#).is_err());
    }
}
