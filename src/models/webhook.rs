//! Diesel models for outbound webhooks and their delivery log.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{DeliveryId, OrgId, TypeConstraintError, WebUrl, WebhookId};
use crate::domain::webhook::{
    DeliveryOutcome, NewWebhook as DomainNewWebhook,
    NewWebhookDelivery as DomainNewWebhookDelivery, Webhook as DomainWebhook,
    WebhookDelivery as DomainWebhookDelivery, join_event_list, parse_event_list,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::webhooks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Webhook {
    pub id: i32,
    pub org_id: i32,
    pub url: String,
    pub secret: String,
    pub events: String,
    pub is_active: bool,
    pub failure_count: i32,
    pub last_success_at: Option<NaiveDateTime>,
    pub last_failure_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::webhooks)]
pub struct NewWebhook<'a> {
    pub org_id: i32,
    pub url: &'a str,
    pub secret: &'a str,
    pub events: String,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Webhook, foreign_key = webhook_id))]
#[diesel(table_name = crate::schema::webhook_deliveries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WebhookDelivery {
    pub id: i32,
    pub webhook_id: i32,
    pub event: String,
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub response_status: Option<i32>,
    pub last_error: Option<String>,
    pub created_at: NaiveDateTime,
    pub delivered_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::webhook_deliveries)]
pub struct NewWebhookDelivery<'a> {
    pub webhook_id: i32,
    pub event: &'a str,
    pub payload: &'a str,
    pub status: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::webhook_deliveries)]
#[diesel(treat_none_as_null = true)]
pub struct DeliveryChangeset<'a> {
    pub status: &'a str,
    pub attempts: i32,
    pub response_status: Option<i32>,
    pub last_error: Option<&'a str>,
    pub delivered_at: Option<NaiveDateTime>,
}

impl TryFrom<Webhook> for DomainWebhook {
    type Error = TypeConstraintError;

    fn try_from(row: Webhook) -> Result<Self, Self::Error> {
        Ok(Self {
            id: WebhookId::new(row.id)?,
            org_id: OrgId::new(row.org_id)?,
            url: WebUrl::new(row.url)?,
            secret: row.secret,
            events: parse_event_list(&row.events)?,
            is_active: row.is_active,
            failure_count: row.failure_count,
            last_success_at: row.last_success_at,
            last_failure_at: row.last_failure_at,
            created_at: row.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewWebhook> for NewWebhook<'a> {
    fn from(hook: &'a DomainNewWebhook) -> Self {
        Self {
            org_id: hook.org_id.get(),
            url: hook.url.as_str(),
            secret: &hook.secret,
            events: join_event_list(&hook.events),
        }
    }
}

impl TryFrom<WebhookDelivery> for DomainWebhookDelivery {
    type Error = TypeConstraintError;

    fn try_from(row: WebhookDelivery) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DeliveryId::new(row.id)?,
            webhook_id: WebhookId::new(row.webhook_id)?,
            event: row.event.parse()?,
            payload: row.payload,
            status: row.status.parse()?,
            attempts: row.attempts,
            response_status: row.response_status,
            last_error: row.last_error,
            created_at: row.created_at,
            delivered_at: row.delivered_at,
        })
    }
}

impl<'a> From<&'a DomainNewWebhookDelivery> for NewWebhookDelivery<'a> {
    fn from(delivery: &'a DomainNewWebhookDelivery) -> Self {
        Self {
            webhook_id: delivery.webhook_id.get(),
            event: delivery.event.as_str(),
            payload: &delivery.payload,
            status: "Pending",
        }
    }
}

impl<'a> From<&'a DeliveryOutcome> for DeliveryChangeset<'a> {
    fn from(outcome: &'a DeliveryOutcome) -> Self {
        Self {
            status: if outcome.succeeded {
                "Succeeded"
            } else {
                "Failed"
            },
            attempts: outcome.attempts,
            response_status: outcome.response_status,
            last_error: outcome.last_error.as_deref(),
            delivered_at: outcome
                .succeeded
                .then(|| chrono::Utc::now().naive_utc()),
        }
    }
}
