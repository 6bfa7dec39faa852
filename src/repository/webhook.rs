use diesel::prelude::*;

use crate::domain::types::{DeliveryId, OrgId, WebhookId};
use crate::domain::webhook::{
    DeliveryOutcome, DeliveryStatus, MAX_CONSECUTIVE_FAILURES, NewWebhook, NewWebhookDelivery,
    Webhook, WebhookDelivery, WebhookEvent,
};
use crate::models::webhook::{
    DeliveryChangeset, NewWebhook as DbNewWebhook, NewWebhookDelivery as DbNewWebhookDelivery,
    Webhook as DbWebhook, WebhookDelivery as DbWebhookDelivery,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, WebhookReader, WebhookWriter};
use crate::schema::{webhook_deliveries, webhooks};

impl WebhookReader for DieselRepository {
    fn get_webhook_by_id(&self, id: WebhookId, org_id: OrgId) -> RepositoryResult<Option<Webhook>> {
        let mut conn = self.conn()?;

        let hook = webhooks::table
            .filter(webhooks::id.eq(id.get()))
            .filter(webhooks::org_id.eq(org_id.get()))
            .select(DbWebhook::as_select())
            .first::<DbWebhook>(&mut conn)
            .optional()?;

        Ok(hook.map(Webhook::try_from).transpose()?)
    }

    fn list_webhooks(&self, org_id: OrgId) -> RepositoryResult<Vec<Webhook>> {
        let mut conn = self.conn()?;

        let rows = webhooks::table
            .filter(webhooks::org_id.eq(org_id.get()))
            .order(webhooks::created_at.asc())
            .select(DbWebhook::as_select())
            .load::<DbWebhook>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(Webhook::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn list_webhooks_for_event(
        &self,
        org_id: OrgId,
        event: WebhookEvent,
    ) -> RepositoryResult<Vec<Webhook>> {
        let mut conn = self.conn()?;

        let rows = webhooks::table
            .filter(webhooks::org_id.eq(org_id.get()))
            .filter(webhooks::is_active.eq(true))
            .order(webhooks::id.asc())
            .select(DbWebhook::as_select())
            .load::<DbWebhook>(&mut conn)?;

        // Subscriptions live in a comma separated column; match them after parsing.
        let hooks = rows
            .into_iter()
            .map(Webhook::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(hooks
            .into_iter()
            .filter(|hook| hook.subscribes_to(event))
            .collect())
    }

    fn list_deliveries(
        &self,
        webhook_id: WebhookId,
        org_id: OrgId,
        limit: i64,
    ) -> RepositoryResult<Vec<WebhookDelivery>> {
        let mut conn = self.conn()?;

        let rows = webhook_deliveries::table
            .inner_join(webhooks::table)
            .filter(webhook_deliveries::webhook_id.eq(webhook_id.get()))
            .filter(webhooks::org_id.eq(org_id.get()))
            .order(webhook_deliveries::id.desc())
            .limit(limit)
            .select(DbWebhookDelivery::as_select())
            .load::<DbWebhookDelivery>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(WebhookDelivery::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn list_failed_deliveries(
        &self,
        limit: i64,
    ) -> RepositoryResult<Vec<(WebhookDelivery, Webhook)>> {
        let mut conn = self.conn()?;

        let rows = webhook_deliveries::table
            .inner_join(webhooks::table)
            .filter(webhook_deliveries::status.eq(DeliveryStatus::Failed.as_str()))
            .filter(webhooks::is_active.eq(true))
            // Same rule as `is_retryable_status`; a null status is a transport error.
            .filter(
                webhook_deliveries::response_status
                    .is_null()
                    .or(webhook_deliveries::response_status.eq_any([408, 429]))
                    .or(webhook_deliveries::response_status.ge(500)),
            )
            .order(webhook_deliveries::id.asc())
            .limit(limit)
            .select((DbWebhookDelivery::as_select(), DbWebhook::as_select()))
            .load::<(DbWebhookDelivery, DbWebhook)>(&mut conn)?;

        rows.into_iter()
            .map(|(delivery, hook)| -> RepositoryResult<(WebhookDelivery, Webhook)> {
                Ok((WebhookDelivery::try_from(delivery)?, Webhook::try_from(hook)?))
            })
            .collect()
    }
}

impl WebhookWriter for DieselRepository {
    fn create_webhook(&self, webhook: &NewWebhook) -> RepositoryResult<Webhook> {
        let mut conn = self.conn()?;

        let stored = diesel::insert_into(webhooks::table)
            .values(DbNewWebhook::from(webhook))
            .returning(DbWebhook::as_returning())
            .get_result::<DbWebhook>(&mut conn)?;

        Ok(stored.try_into()?)
    }

    fn delete_webhook(&self, id: WebhookId, org_id: OrgId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        // Deliveries go with the webhook through ON DELETE CASCADE.
        let deleted = diesel::delete(
            webhooks::table
                .filter(webhooks::id.eq(id.get()))
                .filter(webhooks::org_id.eq(org_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn enable_webhook(&self, id: WebhookId, org_id: OrgId) -> RepositoryResult<Webhook> {
        let mut conn = self.conn()?;

        let updated = diesel::update(
            webhooks::table
                .filter(webhooks::id.eq(id.get()))
                .filter(webhooks::org_id.eq(org_id.get())),
        )
        .set((webhooks::is_active.eq(true), webhooks::failure_count.eq(0)))
        .returning(DbWebhook::as_returning())
        .get_result::<DbWebhook>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn create_delivery(&self, delivery: &NewWebhookDelivery) -> RepositoryResult<WebhookDelivery> {
        let mut conn = self.conn()?;

        let stored = diesel::insert_into(webhook_deliveries::table)
            .values(DbNewWebhookDelivery::from(delivery))
            .returning(DbWebhookDelivery::as_returning())
            .get_result::<DbWebhookDelivery>(&mut conn)?;

        Ok(stored.try_into()?)
    }

    fn finish_delivery(
        &self,
        id: DeliveryId,
        outcome: &DeliveryOutcome,
    ) -> RepositoryResult<WebhookDelivery> {
        let mut conn = self.conn()?;

        let updated = diesel::update(webhook_deliveries::table.find(id.get()))
            .set(DeliveryChangeset::from(outcome))
            .returning(DbWebhookDelivery::as_returning())
            .get_result::<DbWebhookDelivery>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn record_webhook_success(&self, id: WebhookId) -> RepositoryResult<Webhook> {
        let mut conn = self.conn()?;

        let updated = diesel::update(webhooks::table.find(id.get()))
            .set((
                webhooks::failure_count.eq(0),
                webhooks::last_success_at.eq(Some(chrono::Utc::now().naive_utc())),
            ))
            .returning(DbWebhook::as_returning())
            .get_result::<DbWebhook>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn record_webhook_failure(&self, id: WebhookId) -> RepositoryResult<Webhook> {
        let mut conn = self.conn()?;

        conn.transaction::<Webhook, RepositoryError, _>(|conn| {
            let mut updated = diesel::update(webhooks::table.find(id.get()))
                .set((
                    webhooks::failure_count.eq(webhooks::failure_count + 1),
                    webhooks::last_failure_at.eq(Some(chrono::Utc::now().naive_utc())),
                ))
                .returning(DbWebhook::as_returning())
                .get_result::<DbWebhook>(conn)?;

            if updated.is_active && updated.failure_count >= MAX_CONSECUTIVE_FAILURES {
                updated = diesel::update(webhooks::table.find(id.get()))
                    .set(webhooks::is_active.eq(false))
                    .returning(DbWebhook::as_returning())
                    .get_result::<DbWebhook>(conn)?;
                log::warn!(
                    "Webhook {} disabled after {} consecutive failures",
                    updated.id,
                    updated.failure_count
                );
            }

            Ok(updated.try_into()?)
        })
    }
}
