//! Delivery contacts.

use serde::Serialize;

use orderhub_core::{ContactId, UserId};

/// A delivery address and phone number owned by a user.
///
/// Orders reference a contact but never own it; deleting a contact leaves
/// placed orders intact with a null contact.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Contact {
    pub id: ContactId,
    pub user_id: UserId,
    pub city: String,
    pub street: String,
    pub house: String,
    pub apartment: String,
    pub phone: String,
}
