//! Authentication extractors.
//!
//! Token issuance lives outside this service; requests carry an opaque key
//! in the `Authorization` header (`Token <key>`, `Bearer <key>` also
//! accepted) which the extractor resolves against the `auth_tokens` table.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::db::UserRepository;
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires a valid auth token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(AuthUser(user): AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct AuthUser(pub User);

/// Extractor that additionally requires the caller to be a shop account.
///
/// Rejects buyers with `403`, anonymous callers with `401`.
pub struct RequireShop(pub User);

/// Rejection for the auth extractors.
pub enum AuthRejection {
    /// No token, malformed header, or unknown token.
    Unauthorized,
    /// Valid token but the account type is not allowed.
    ShopsOnly,
    /// Token lookup failed.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            Self::ShopsOnly => (StatusCode::FORBIDDEN, "Shop accounts only"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (status, Json(json!({ "status": false, "error": message }))).into_response()
    }
}

/// Pull the token out of an `Authorization` header value.
fn extract_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.split_once(' ')?;
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    match scheme {
        "Token" | "Bearer" => Some(token),
        _ => None,
    }
}

async fn resolve_user(parts: &Parts, state: &AppState) -> Result<User, AuthRejection> {
    let header_value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthRejection::Unauthorized)?;

    let token = extract_token(header_value).ok_or(AuthRejection::Unauthorized)?;

    UserRepository::new(state.pool())
        .get_by_token(token)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "auth token lookup failed");
            AuthRejection::Internal
        })?
        .ok_or(AuthRejection::Unauthorized)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireShop {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_user(parts, state).await?;
        if !user.is_shop() {
            return Err(AuthRejection::ShopsOnly);
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_schemes() {
        assert_eq!(extract_token("Token abc123"), Some("abc123"));
        assert_eq!(extract_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_token("Basic abc123"), None);
    }

    #[test]
    fn test_extract_token_malformed() {
        assert_eq!(extract_token("Token"), None);
        assert_eq!(extract_token("Token "), None);
        assert_eq!(extract_token(""), None);
    }

    #[test]
    fn test_extract_token_trims_whitespace() {
        assert_eq!(extract_token("Token  abc123 "), Some("abc123"));
    }
}
