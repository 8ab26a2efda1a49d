//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Every error body follows the same envelope as success responses:
//! `{"status": false, "error": "..."}`, or `"errors"` with a list when an
//! operation reports several failures at once (batch validation, stock
//! shortages).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::{BasketError, OrderError, RepositoryError};
use crate::models::StockShortage;
use crate::services::import::ImportError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Resource not found or not owned by the caller.
    #[error("Not found")]
    NotFound,

    /// Request is missing a valid auth token.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Caller is authenticated but not allowed to perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from the client.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Several validation failures reported together.
    #[error("Validation errors")]
    ValidationMany(Vec<String>),

    /// Unique-constraint style conflict.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Placement rejected because listings lack stock.
    #[error("Insufficient stock")]
    InsufficientStock(Vec<StockShortage>),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl From<BasketError> for AppError {
    fn from(e: BasketError) -> Self {
        match e {
            BasketError::Repository(repo) => repo.into(),
            BasketError::Rejected(errors) => Self::ValidationMany(errors),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::Repository(repo) => repo.into(),
            OrderError::EmptyBasket => Self::Validation("basket is empty".to_owned()),
            OrderError::ContactNotFound => Self::Validation("contact not found".to_owned()),
            OrderError::InsufficientStock(shortages) => Self::InsufficientStock(shortages),
        }
    }
}

impl From<ImportError> for AppError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::Fetch(err) => Self::Internal(format!("price list fetch failed: {err}")),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Validation(_) | Self::ValidationMany(_) | Self::InsufficientStock(_) => {
                StatusCode::BAD_REQUEST
            }
        };

        // Don't expose internal error details to clients
        let body = match self {
            Self::Database(_) | Self::Internal(_) => {
                json!({ "status": false, "error": "Internal server error" })
            }
            Self::ValidationMany(errors) => json!({ "status": false, "errors": errors }),
            Self::InsufficientStock(shortages) => json!({
                "status": false,
                "error": "insufficient stock",
                "unavailable_items": shortages,
            }),
            other => json!({ "status": false, "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
