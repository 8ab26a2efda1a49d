//! User accounts.
//!
//! Registration and token issuance are handled by an external identity
//! service; this API only resolves tokens to users.

use chrono::{DateTime, Utc};
use serde::Serialize;

use orderhub_core::{UserId, UserType};

/// An authenticated account, buyer or shop partner.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub position: String,
    pub user_type: UserType,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this account may use partner-only operations.
    #[must_use]
    pub const fn is_shop(&self) -> bool {
        matches!(self.user_type, UserType::Shop)
    }
}
