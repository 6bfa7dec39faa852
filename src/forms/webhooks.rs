use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{OrgId, WebUrl};
use crate::domain::webhook::{NewWebhook, WebhookEvent};
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
pub struct WebhookForm {
    #[validate(url)]
    pub url: String,
    #[validate(length(min = 1))]
    pub events: Vec<String>,
}

pub struct WebhookPayload {
    pub url: WebUrl,
    pub events: Vec<WebhookEvent>,
}

impl TryFrom<WebhookForm> for WebhookPayload {
    type Error = FormError;

    fn try_from(form: WebhookForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let events = form
            .events
            .iter()
            .map(|name| {
                name.parse::<WebhookEvent>()
                    .map_err(|_| FormError::InvalidValue(format!("unknown event: {name}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            url: WebUrl::new(form.url)?,
            events,
        })
    }
}

impl WebhookPayload {
    /// Builds the subscription with a freshly generated secret.
    pub fn into_domain(self, org_id: OrgId) -> Result<NewWebhook, FormError> {
        Ok(NewWebhook::new(org_id, self.url, self.events)?)
    }
}
