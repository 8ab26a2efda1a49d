//! Order notification dispatch.
//!
//! Order lifecycle events are delivered to an external webhook (the mail or
//! messaging gateway) as JSON. Dispatch is fire and forget: delivery runs on
//! a spawned task after the database transaction commits, and a failed
//! delivery is logged, never surfaced to the client. With no webhook
//! configured the dispatcher is a no-op.

use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

use orderhub_core::{OrderId, OrderState};

use crate::config::{ApiConfig, webhook_bearer};

/// Errors that can occur when delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Webhook returned an error response.
    #[error("webhook error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Order notification dispatcher.
#[derive(Clone)]
pub struct Notifier {
    inner: Option<NotifierInner>,
}

#[derive(Clone)]
struct NotifierInner {
    client: reqwest::Client,
    url: String,
}

impl Notifier {
    /// Build a dispatcher from configuration; disabled when no webhook URL
    /// is set.
    #[must_use]
    pub fn from_config(config: &ApiConfig) -> Self {
        let Some(url) = config.notify_webhook_url.clone() else {
            return Self { inner: None };
        };

        let mut headers = HeaderMap::new();
        if let Some(bearer) = webhook_bearer(config.notify_webhook_token.as_ref())
            && let Ok(value) = HeaderValue::from_str(&bearer)
        {
            headers.insert("Authorization", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_default();

        Self {
            inner: Some(NotifierInner { client, url }),
        }
    }

    /// Whether a webhook is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Notify the buyer and the back office that an order was placed.
    ///
    /// Spawned; returns immediately.
    pub fn order_placed(&self, order_id: OrderId, email: &str, total: Decimal) {
        self.dispatch(order_placed_payload(order_id, email, total));
        self.dispatch(order_placed_admin_payload(order_id, email, total));
    }

    /// Notify the buyer that an order changed state.
    ///
    /// Spawned; returns immediately.
    pub fn order_status_changed(
        &self,
        order_id: OrderId,
        email: &str,
        old: OrderState,
        new: OrderState,
    ) {
        self.dispatch(status_changed_payload(order_id, email, old, new));
    }

    fn dispatch(&self, payload: serde_json::Value) {
        let Some(inner) = self.inner.clone() else {
            return;
        };

        tokio::spawn(async move {
            if let Err(e) = inner.deliver(&payload).await {
                tracing::warn!(error = %e, "notification delivery failed");
            }
        });
    }
}

impl NotifierInner {
    async fn deliver(&self, payload: &serde_json::Value) -> Result<(), NotifyError> {
        let response = self.client.post(&self.url).json(payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

fn order_placed_payload(order_id: OrderId, email: &str, total: Decimal) -> serde_json::Value {
    json!({
        "event": "order_placed",
        "order_id": order_id,
        "email": email,
        "total": total,
    })
}

fn order_placed_admin_payload(order_id: OrderId, email: &str, total: Decimal) -> serde_json::Value {
    json!({
        "event": "order_placed_admin",
        "order_id": order_id,
        "buyer_email": email,
        "total": total,
    })
}

fn status_changed_payload(
    order_id: OrderId,
    email: &str,
    old: OrderState,
    new: OrderState,
) -> serde_json::Value {
    json!({
        "event": "order_status_changed",
        "order_id": order_id,
        "email": email,
        "old_state": old,
        "new_state": new,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_placed_payload_shape() {
        let payload = order_placed_payload(OrderId::new(7), "buyer@example.com", Decimal::from(42));
        assert_eq!(payload["event"], "order_placed");
        assert_eq!(payload["order_id"], 7);
        assert_eq!(payload["email"], "buyer@example.com");
        assert_eq!(payload["total"], "42");
    }

    #[test]
    fn test_status_changed_payload_states_serialize_snake_case() {
        let payload = status_changed_payload(
            OrderId::new(7),
            "buyer@example.com",
            OrderState::New,
            OrderState::Canceled,
        );
        assert_eq!(payload["old_state"], "new");
        assert_eq!(payload["new_state"], "canceled");
    }

    #[test]
    fn test_disabled_without_webhook_url() {
        let notifier = Notifier { inner: None };
        assert!(!notifier.is_enabled());
        // Dispatch on a disabled notifier is a no-op.
        notifier.order_placed(OrderId::new(1), "buyer@example.com", Decimal::ZERO);
    }
}
