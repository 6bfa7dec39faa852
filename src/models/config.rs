//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_webhook_max_attempts() -> u32 {
    3
}

fn default_webhook_retry_base_ms() -> u64 {
    500
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// HS256 key shared with the identity provider; also keys the session cookie.
    pub secret: String,
    /// Signing secret of the Stripe webhook endpoint (`whsec_...`).
    pub stripe_webhook_secret: String,
    #[serde(default)]
    pub resend_api_key: Option<String>,
    pub email_from: String,
    pub ai_gateway_url: String,
    #[serde(default)]
    pub ai_api_key: Option<String>,
    #[serde(default = "default_ai_model")]
    pub ai_model: String,
    #[serde(default = "default_webhook_max_attempts")]
    pub webhook_max_attempts: u32,
    #[serde(default = "default_webhook_retry_base_ms")]
    pub webhook_retry_base_ms: u64,
}
