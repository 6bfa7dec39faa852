use serde::Serialize;

use crate::domain::webhook::Webhook;

/// Freshly created webhook; the only response that reveals the secret.
#[derive(Debug, Serialize)]
pub struct CreatedWebhook {
    #[serde(flatten)]
    pub webhook: Webhook,
    pub secret: String,
}
