//! Outbound webhook delivery.
//!
//! Payloads are wrapped in an envelope, signed with the subscription secret
//! and POSTed with exponential backoff. Each delivery is recorded and the
//! webhook's consecutive failure counter is updated once the retries are
//! exhausted, which disables the webhook at the limit.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, header};
use serde_json::{Value, json};
use sha2::Sha256;
use thiserror::Error;

use crate::domain::types::{DeliveryId, OrgId};
use crate::domain::webhook::{
    DeliveryOutcome, NewWebhookDelivery, Webhook, WebhookDelivery, WebhookEvent,
};
use crate::models::config::ServerConfig;
use crate::repository::{WebhookReader, WebhookWriter};
use crate::services::EventPublisher;

type HmacSha256 = Hmac<Sha256>;

pub const EVENT_HEADER: &str = "X-Stormdesk-Event";
pub const DELIVERY_HEADER: &str = "X-Stormdesk-Delivery";
pub const SIGNATURE_HEADER: &str = "X-Stormdesk-Signature";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("receiver responded with status {0}")]
    Status(u16),
}

/// `sha256=<hex>` HMAC of the raw body keyed by the webhook secret.
pub fn sign(secret: &str, body: &[u8]) -> String {
    // HMAC accepts keys of any length.
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Wraps event data in the envelope integrators receive.
pub fn envelope(org_id: OrgId, event: WebhookEvent, data: Value) -> Value {
    json!({
        "id": uuid::Uuid::new_v4().to_string(),
        "event": event.as_str(),
        "created_at": Utc::now().to_rfc3339(),
        "org_id": org_id.get(),
        "data": data,
    })
}

/// Request timeouts, throttling and server errors are worth another attempt.
pub fn is_retryable_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..600).contains(&status)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            max_attempts: config.webhook_max_attempts.max(1),
            base_delay: Duration::from_millis(config.webhook_retry_base_ms),
        }
    }

    /// Delay after the failed `attempt` (1-based): `base × 2^(attempt-1)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

/// Fully prepared delivery request.
#[derive(Clone, Debug, PartialEq)]
pub struct SignedRequest {
    pub url: String,
    pub event: WebhookEvent,
    pub delivery_id: DeliveryId,
    pub body: String,
    pub signature: String,
}

impl SignedRequest {
    pub fn new(webhook: &Webhook, delivery: &WebhookDelivery) -> Self {
        Self {
            url: webhook.url.as_str().to_string(),
            event: delivery.event,
            delivery_id: delivery.id,
            signature: sign(&webhook.secret, delivery.payload.as_bytes()),
            body: delivery.payload.clone(),
        }
    }
}

/// Performs a single HTTP attempt, returning the response status.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn send(&self, request: &SignedRequest) -> Result<u16, DeliveryError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("stormdesk-webhooks/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DeliveryError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookTransport for ReqwestTransport {
    async fn send(&self, request: &SignedRequest) -> Result<u16, DeliveryError> {
        let response = self
            .client
            .post(&request.url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(EVENT_HEADER, request.event.as_str())
            .header(DELIVERY_HEADER, request.delivery_id.to_string())
            .header(SIGNATURE_HEADER, &request.signature)
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        Ok(response.status().as_u16())
    }
}

/// Sends `request` until it succeeds, fails permanently or runs out of attempts.
pub async fn deliver(
    transport: &dyn WebhookTransport,
    policy: &RetryPolicy,
    request: &SignedRequest,
) -> DeliveryOutcome {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;
    let mut response_status = None;
    let mut last_error = None;

    while attempts < max_attempts {
        attempts += 1;

        let retryable = match transport.send(request).await {
            Ok(status) if (200..300).contains(&status) => {
                return DeliveryOutcome {
                    succeeded: true,
                    attempts: attempts as i32,
                    response_status: Some(i32::from(status)),
                    last_error: None,
                };
            }
            Ok(status) => {
                response_status = Some(i32::from(status));
                last_error = Some(DeliveryError::Status(status).to_string());
                is_retryable_status(status)
            }
            Err(err) => {
                last_error = Some(err.to_string());
                true
            }
        };

        if !retryable || attempts >= max_attempts {
            break;
        }

        let delay = policy.backoff(attempts);
        log::debug!(
            "Delivery {} to {} failed (attempt {attempts}), retrying in {delay:?}",
            request.delivery_id,
            request.url
        );
        actix_web::rt::time::sleep(delay).await;
    }

    DeliveryOutcome {
        succeeded: false,
        attempts: attempts as i32,
        response_status,
        last_error,
    }
}

/// Delivers a recorded payload and stores the outcome.
///
/// Attempts accumulate across runs so retried deliveries keep their history.
pub async fn run_delivery<R>(
    repo: &R,
    transport: &dyn WebhookTransport,
    policy: &RetryPolicy,
    webhook: &Webhook,
    delivery: &WebhookDelivery,
) -> DeliveryOutcome
where
    R: WebhookWriter + ?Sized,
{
    let request = SignedRequest::new(webhook, delivery);
    let mut outcome = deliver(transport, policy, &request).await;
    outcome.attempts += delivery.attempts;

    if let Err(err) = repo.finish_delivery(delivery.id, &outcome) {
        log::error!("Failed to record webhook delivery {}: {err}", delivery.id);
    }

    let counter = if outcome.succeeded {
        repo.record_webhook_success(webhook.id)
    } else {
        log::warn!(
            "Webhook {} delivery {} failed: {}",
            webhook.id,
            delivery.id,
            outcome.last_error.as_deref().unwrap_or("unknown error")
        );
        repo.record_webhook_failure(webhook.id)
    };
    if let Err(err) = counter {
        log::error!("Failed to update webhook {} counters: {err}", webhook.id);
    }

    outcome
}

/// Records deliveries and runs them on the actix runtime.
pub struct WebhookDispatcher<R> {
    repo: R,
    transport: Arc<dyn WebhookTransport>,
    policy: RetryPolicy,
}

impl<R> WebhookDispatcher<R>
where
    R: WebhookReader + WebhookWriter + Clone + 'static,
{
    pub fn new(repo: R, transport: Arc<dyn WebhookTransport>, policy: RetryPolicy) -> Self {
        Self {
            repo,
            transport,
            policy,
        }
    }

    fn enqueue(&self, webhook: Webhook, event: WebhookEvent, payload: String) {
        let delivery = match self.repo.create_delivery(&NewWebhookDelivery {
            webhook_id: webhook.id,
            event,
            payload,
        }) {
            Ok(delivery) => delivery,
            Err(err) => {
                log::error!("Failed to record delivery for webhook {}: {err}", webhook.id);
                return;
            }
        };

        let repo = self.repo.clone();
        let transport = Arc::clone(&self.transport);
        let policy = self.policy.clone();
        actix_web::rt::spawn(async move {
            run_delivery(&repo, transport.as_ref(), &policy, &webhook, &delivery).await;
        });
    }
}

impl<R> EventPublisher for WebhookDispatcher<R>
where
    R: WebhookReader + WebhookWriter + Clone + 'static,
{
    fn publish(&self, org_id: OrgId, event: WebhookEvent, data: Value) {
        let hooks = match self.repo.list_webhooks_for_event(org_id, event) {
            Ok(hooks) => hooks,
            Err(err) => {
                log::error!("Failed to load webhooks for {event}: {err}");
                return;
            }
        };
        if hooks.is_empty() {
            return;
        }

        let payload = envelope(org_id, event, data).to_string();
        for hook in hooks {
            self.enqueue(hook, event, payload.clone());
        }
    }

    fn publish_to(&self, webhook: &Webhook, event: WebhookEvent, data: Value) {
        let payload = envelope(webhook.org_id, event, data).to_string();
        self.enqueue(webhook.clone(), event, payload);
    }
}
