//! Outbound webhook subscriptions and their delivery log.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{DeliveryId, OrgId, TypeConstraintError, WebUrl, WebhookId};

/// Consecutive failed deliveries after which a webhook is disabled.
pub const MAX_CONSECUTIVE_FAILURES: i32 = 10;

/// Event names integrators can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WebhookEvent {
    ClaimCreated,
    ClaimUpdated,
    ClaimStatusChanged,
    EstimateCreated,
    EstimateApproved,
    JobScheduled,
    LeadConverted,
    DepreciationUpdated,
    Test,
}

impl WebhookEvent {
    pub const ALL: &'static [WebhookEvent] = &[
        WebhookEvent::ClaimCreated,
        WebhookEvent::ClaimUpdated,
        WebhookEvent::ClaimStatusChanged,
        WebhookEvent::EstimateCreated,
        WebhookEvent::EstimateApproved,
        WebhookEvent::JobScheduled,
        WebhookEvent::LeadConverted,
        WebhookEvent::DepreciationUpdated,
        WebhookEvent::Test,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            WebhookEvent::ClaimCreated => "claim.created",
            WebhookEvent::ClaimUpdated => "claim.updated",
            WebhookEvent::ClaimStatusChanged => "claim.status_changed",
            WebhookEvent::EstimateCreated => "estimate.created",
            WebhookEvent::EstimateApproved => "estimate.approved",
            WebhookEvent::JobScheduled => "job.scheduled",
            WebhookEvent::LeadConverted => "lead.converted",
            WebhookEvent::DepreciationUpdated => "depreciation.updated",
            WebhookEvent::Test => "webhook.test",
        }
    }
}

impl Display for WebhookEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebhookEvent {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WebhookEvent::ALL
            .iter()
            .copied()
            .find(|event| event.as_str() == s.trim())
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown event: {s}")))
    }
}

impl TryFrom<String> for WebhookEvent {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WebhookEvent> for String {
    fn from(value: WebhookEvent) -> Self {
        value.as_str().to_string()
    }
}

/// Parses the comma separated list stored in the `events` column.
pub fn parse_event_list(raw: &str) -> Result<Vec<WebhookEvent>, TypeConstraintError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

/// Serializes events for the `events` column.
pub fn join_event_list(events: &[WebhookEvent]) -> String {
    events
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Webhook {
    pub id: WebhookId,
    pub org_id: OrgId,
    pub url: WebUrl,
    #[serde(skip_serializing)]
    pub secret: String,
    pub events: Vec<WebhookEvent>,
    pub is_active: bool,
    pub failure_count: i32,
    pub last_success_at: Option<NaiveDateTime>,
    pub last_failure_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Webhook {
    pub fn subscribes_to(&self, event: WebhookEvent) -> bool {
        event == WebhookEvent::Test || self.events.contains(&event)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewWebhook {
    pub org_id: OrgId,
    pub url: WebUrl,
    pub secret: String,
    pub events: Vec<WebhookEvent>,
}

impl NewWebhook {
    pub fn new(
        org_id: OrgId,
        url: WebUrl,
        events: Vec<WebhookEvent>,
    ) -> Result<Self, TypeConstraintError> {
        if !(url.as_str().starts_with("https://") || url.as_str().starts_with("http://")) {
            return Err(TypeConstraintError::InvalidUrl);
        }
        let mut events = events;
        events.sort_by_key(|e| e.as_str());
        events.dedup();
        if events.is_empty() {
            return Err(TypeConstraintError::InvalidValue(
                "at least one event is required".to_string(),
            ));
        }
        Ok(Self {
            org_id,
            url,
            secret: generate_secret(),
            events,
        })
    }
}

/// Random signing secret handed to the integrator once.
pub fn generate_secret() -> String {
    format!(
        "whsec_{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

status_enum!(
    DeliveryStatus {
        Pending,
        Succeeded,
        Failed,
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WebhookDelivery {
    pub id: DeliveryId,
    pub webhook_id: WebhookId,
    pub event: WebhookEvent,
    pub payload: String,
    pub status: DeliveryStatus,
    pub attempts: i32,
    pub response_status: Option<i32>,
    pub last_error: Option<String>,
    pub created_at: NaiveDateTime,
    pub delivered_at: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewWebhookDelivery {
    pub webhook_id: WebhookId,
    pub event: WebhookEvent,
    pub payload: String,
}

/// Outcome of delivering a payload, recorded on the delivery row.
#[derive(Clone, Debug, PartialEq)]
pub struct DeliveryOutcome {
    pub succeeded: bool,
    pub attempts: i32,
    pub response_status: Option<i32>,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_lists_round_trip_through_column() {
        let events = parse_event_list("claim.created, estimate.approved,,").expect("events");
        assert_eq!(
            events,
            vec![WebhookEvent::ClaimCreated, WebhookEvent::EstimateApproved]
        );
        assert_eq!(join_event_list(&events), "claim.created,estimate.approved");
        assert!(parse_event_list("claim.deleted").is_err());
    }

    #[test]
    fn new_webhook_requires_events_and_http_url() {
        let org = OrgId::new(1).expect("org");
        let url = WebUrl::new("https://example.com/hook").expect("url");
        assert!(NewWebhook::new(org, url.clone(), vec![]).is_err());

        let hook = NewWebhook::new(
            org,
            url,
            vec![WebhookEvent::JobScheduled, WebhookEvent::JobScheduled],
        )
        .expect("webhook");
        assert_eq!(hook.events, vec![WebhookEvent::JobScheduled]);
        assert!(hook.secret.starts_with("whsec_"));

        let ftp = WebUrl::new("ftp://example.com/hook").expect("url");
        assert!(NewWebhook::new(org, ftp, vec![WebhookEvent::ClaimCreated]).is_err());
    }

    #[test]
    fn events_serialize_with_dotted_names() {
        let json = serde_json::to_string(&WebhookEvent::ClaimStatusChanged).expect("json");
        assert_eq!(json, "\"claim.status_changed\"");
        let parsed: WebhookEvent = serde_json::from_str("\"lead.converted\"").expect("event");
        assert_eq!(parsed, WebhookEvent::LeadConverted);
    }
}
