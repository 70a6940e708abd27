//! Supplier webhook notifier.
//!
//! Fire-and-forget from the caller's perspective: the handoff spawns a
//! detached task, so delivery runs independently of the request that created
//! the order and cannot outlive-block or fail it. Payloads are idempotent
//! (the remote dedupes on order id), which keeps at-least-once delivery safe.

use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use mandra_core::OrderId;

/// Handoff seam between the order manager and the dispatcher.
///
/// Implementations must return quickly; delivery work belongs on a detached
/// task.
pub trait NewOrderNotifier: Send + Sync {
    fn notify_new_order(&self, order_id: OrderId);
}

/// A notifier that drops every event (dev wiring without a configured
/// supplier endpoint).
#[derive(Debug, Default, Clone)]
pub struct NoopNotifier;

impl NewOrderNotifier for NoopNotifier {
    fn notify_new_order(&self, order_id: OrderId) {
        tracing::debug!(order_id = %order_id, "supplier notifications disabled, dropping event");
    }
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Supplier webhook endpoint.
    pub endpoint: String,
    /// Pre-shared HMAC secret.
    pub secret: String,
    /// Value of the `X-Source` header identifying this system.
    pub source: String,
    /// Delivery attempts before giving up.
    pub max_attempts: u32,
    /// First backoff delay; doubled per attempt.
    pub base_delay: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            secret: String::new(),
            source: "mandra-api".to_string(),
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Serialize)]
struct NewOrderEvent {
    event_type: &'static str,
    order_id: OrderId,
    timestamp: DateTime<Utc>,
}

/// Generate the HMAC-SHA256 signature for a webhook payload.
fn sign_payload(payload: &[u8], secret: &str) -> Result<String, String> {
    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| format!("failed to initialize HMAC: {e}"))?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// HTTP webhook dispatcher with bounded retry.
#[derive(Clone)]
pub struct SupplierNotifier {
    http: reqwest::Client,
    config: NotifierConfig,
}

impl SupplierNotifier {
    pub fn new(config: NotifierConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self { http, config }
    }

    /// Deliver the event, retrying with exponential backoff. Every failure is
    /// logged with the order id and swallowed here — nothing propagates to
    /// the order that triggered the event.
    async fn deliver(&self, order_id: OrderId) {
        let payload = NewOrderEvent {
            event_type: "new_purchase_order",
            order_id,
            timestamp: Utc::now(),
        };

        let payload_bytes = match serde_json::to_vec(&payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "failed to serialize webhook payload");
                return;
            }
        };

        let signature = match sign_payload(&payload_bytes, &self.config.secret) {
            Ok(sig) => sig,
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "failed to sign webhook payload");
                return;
            }
        };

        let mut delay = self.config.base_delay;
        for attempt in 1..=self.config.max_attempts {
            let result = self
                .http
                .post(&self.config.endpoint)
                .header("Content-Type", "application/json")
                .header("X-Webhook-Signature", &signature)
                .header("X-Source", &self.config.source)
                .body(payload_bytes.clone())
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    tracing::info!(
                        order_id = %order_id,
                        status = %response.status(),
                        "supplier webhook delivered"
                    );
                    return;
                }
                Ok(response) => {
                    tracing::warn!(
                        order_id = %order_id,
                        status = %response.status(),
                        attempt,
                        "supplier webhook rejected"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        order_id = %order_id,
                        error = %e,
                        attempt,
                        "supplier webhook delivery failed"
                    );
                }
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }

        tracing::warn!(
            order_id = %order_id,
            attempts = self.config.max_attempts,
            "giving up on supplier webhook"
        );
    }
}

impl NewOrderNotifier for SupplierNotifier {
    fn notify_new_order(&self, order_id: OrderId) {
        let notifier = self.clone();
        // Detached: survives response completion and client disconnects.
        tokio::spawn(async move {
            notifier.deliver(order_id).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_hex_sha256_sized_and_deterministic() {
        let payload = br#"{"event_type":"new_purchase_order"}"#;
        let a = sign_payload(payload, "whsec_test").unwrap();
        let b = sign_payload(payload, "whsec_test").unwrap();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, b);
    }

    #[test]
    fn signature_depends_on_secret_and_payload() {
        let payload = br#"{"order_id":1}"#;
        let base = sign_payload(payload, "secret-a").unwrap();
        assert_ne!(base, sign_payload(payload, "secret-b").unwrap());
        assert_ne!(base, sign_payload(br#"{"order_id":2}"#, "secret-a").unwrap());
    }

    #[tokio::test]
    async fn delivery_failure_is_contained() {
        // Unroutable endpoint with minimal backoff: deliver() must return
        // without panicking or surfacing anything.
        let notifier = SupplierNotifier::new(NotifierConfig {
            endpoint: "http://127.0.0.1:9/webhooks/incoming".to_string(),
            secret: "whsec_test".to_string(),
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            ..NotifierConfig::default()
        });

        notifier.deliver(OrderId::new()).await;
    }
}
