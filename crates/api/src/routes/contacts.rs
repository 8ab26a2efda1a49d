//! Delivery contact route handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use orderhub_core::ContactId;

use crate::db::ContactRepository;
use crate::db::contacts::ContactUpdate;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::Contact;
use crate::routes::basket::IdList;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    city: String,
    street: String,
    #[serde(default)]
    house: String,
    #[serde(default)]
    apartment: String,
    phone: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    id: ContactId,
    city: Option<String>,
    street: Option<String>,
    house: Option<String>,
    apartment: Option<String>,
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteContactsRequest {
    items: IdList,
}

/// `GET /contacts` - the caller's delivery contacts.
pub async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Contact>>> {
    let contacts = ContactRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(contacts))
}

/// `POST /contacts` - create a delivery contact.
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateContactRequest>,
) -> Result<Json<Contact>> {
    for (field, value) in [
        ("city", &request.city),
        ("street", &request.street),
        ("phone", &request.phone),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }

    let contact = ContactRepository::new(state.pool())
        .create(
            user.id,
            &request.city,
            &request.street,
            &request.house,
            &request.apartment,
            &request.phone,
        )
        .await?;

    Ok(Json(contact))
}

/// `PUT /contacts` - partial update of one contact.
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<UpdateContactRequest>,
) -> Result<Json<Contact>> {
    let update = ContactUpdate {
        city: request.city,
        street: request.street,
        house: request.house,
        apartment: request.apartment,
        phone: request.phone,
    };

    let contact = ContactRepository::new(state.pool())
        .update(user.id, request.id, &update)
        .await?;

    Ok(Json(contact))
}

/// `DELETE /contacts` - delete contacts by id; foreign ids are ignored.
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<DeleteContactsRequest>,
) -> Result<Json<Value>> {
    let ids: Vec<ContactId> = request
        .items
        .into_vec()
        .into_iter()
        .map(ContactId::new)
        .collect();

    if ids.is_empty() {
        return Err(AppError::Validation("items is empty".to_owned()));
    }

    let deleted = ContactRepository::new(state.pool())
        .delete_many(user.id, &ids)
        .await?;

    Ok(Json(json!({ "status": true, "deleted": deleted })))
}
