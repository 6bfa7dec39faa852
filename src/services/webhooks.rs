//! Administration of outbound webhook subscriptions.

use serde_json::json;

use crate::SERVICE_ADMIN_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::types::{OrgId, WebhookId};
use crate::domain::webhook::{Webhook, WebhookDelivery, WebhookEvent};
use crate::dto::webhooks::CreatedWebhook;
use crate::forms::webhooks::{WebhookForm, WebhookPayload};
use crate::repository::{WebhookReader, WebhookWriter};
use crate::services::{EventPublisher, ServiceError, ServiceResult};

/// Number of deliveries shown per webhook.
pub const DELIVERY_LOG_LIMIT: i64 = 50;

pub fn list_webhooks<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Webhook>>
where
    R: WebhookReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;

    Ok(repo.list_webhooks(org_id)?)
}

/// Registers a subscription. The signing secret is returned once.
pub fn create_webhook<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: WebhookForm,
) -> ServiceResult<CreatedWebhook>
where
    R: WebhookWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let new_webhook = WebhookPayload::try_from(form)?.into_domain(org_id)?;

    let webhook = repo.create_webhook(&new_webhook).map_err(|err| {
        log::error!("Failed to create webhook: {err}");
        err
    })?;

    Ok(CreatedWebhook {
        secret: webhook.secret.clone(),
        webhook,
    })
}

pub fn delete_webhook<R>(repo: &R, user: &AuthenticatedUser, webhook_id: i32) -> ServiceResult<()>
where
    R: WebhookWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;

    repo.delete_webhook(WebhookId::new(webhook_id)?, org_id)?;
    Ok(())
}

/// Re-activates a webhook disabled after repeated failures.
pub fn enable_webhook<R>(repo: &R, user: &AuthenticatedUser, webhook_id: i32) -> ServiceResult<Webhook>
where
    R: WebhookWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;

    let webhook = repo.enable_webhook(WebhookId::new(webhook_id)?, org_id)?;
    log::info!("Webhook {} re-enabled for org {org_id}", webhook.id);

    Ok(webhook)
}

/// Sends a `webhook.test` event to a single subscription.
pub fn send_test_event<R>(
    repo: &R,
    events: &dyn EventPublisher,
    user: &AuthenticatedUser,
    webhook_id: i32,
) -> ServiceResult<()>
where
    R: WebhookReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;

    let webhook = repo
        .get_webhook_by_id(WebhookId::new(webhook_id)?, org_id)?
        .ok_or(ServiceError::NotFound)?;

    events.publish_to(
        &webhook,
        WebhookEvent::Test,
        json!({ "message": "Test delivery from Stormdesk", "webhook_id": webhook.id }),
    );

    Ok(())
}

/// Most recent deliveries of a webhook, newest first.
pub fn list_deliveries<R>(
    repo: &R,
    user: &AuthenticatedUser,
    webhook_id: i32,
) -> ServiceResult<Vec<WebhookDelivery>>
where
    R: WebhookReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let webhook_id = WebhookId::new(webhook_id)?;

    if repo.get_webhook_by_id(webhook_id, org_id)?.is_none() {
        return Err(ServiceError::NotFound);
    }

    Ok(repo.list_deliveries(webhook_id, org_id, DELIVERY_LOG_LIMIT)?)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        ORG, RecordingPublisher, admin_user, sample_webhook, viewer_user,
    };

    fn form() -> WebhookForm {
        WebhookForm {
            url: "https://hooks.example.com/stormdesk".to_string(),
            events: vec!["claim.created".to_string(), "claim.created".to_string()],
        }
    }

    #[test]
    fn webhooks_are_admin_only() {
        let mut repo = MockRepository::new();
        repo.expect_list_webhooks().times(0);
        repo.expect_create_webhook().times(0);

        assert!(matches!(
            list_webhooks(&repo, &viewer_user()),
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            create_webhook(&repo, &viewer_user(), form()),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn create_webhook_returns_secret_once() {
        let mut repo = MockRepository::new();
        repo.expect_create_webhook()
            .withf(|new| {
                new.org_id.get() == ORG
                    && new.secret.starts_with("whsec_")
                    && new.events == vec![WebhookEvent::ClaimCreated]
            })
            .times(1)
            .returning(|new| {
                let mut hook = sample_webhook(1);
                hook.secret = new.secret.clone();
                Ok(hook)
            });

        let created = create_webhook(&repo, &admin_user(), form()).unwrap();
        assert!(created.secret.starts_with("whsec_"));

        let json = serde_json::to_value(&created).unwrap();
        assert_eq!(json["secret"], created.secret.as_str());
        assert_eq!(json["id"], 1);
    }

    #[test]
    fn test_event_goes_to_single_webhook() {
        let mut repo = MockRepository::new();
        repo.expect_get_webhook_by_id()
            .withf(|id, org_id| id.get() == 3 && org_id.get() == ORG)
            .times(1)
            .returning(|id, _| Ok(Some(sample_webhook(id.get()))));
        let events = RecordingPublisher::default();

        send_test_event(&repo, &events, &admin_user(), 3).unwrap();
        assert_eq!(events.names(), vec![WebhookEvent::Test]);
    }

    #[test]
    fn deliveries_of_foreign_webhook_are_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_webhook_by_id().returning(|_, _| Ok(None));
        repo.expect_list_deliveries().times(0);

        let result = list_deliveries(&repo, &admin_user(), 8);
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn enable_unknown_webhook_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_enable_webhook()
            .returning(|_, _| Err(RepositoryError::NotFound));

        let result = enable_webhook(&repo, &admin_user(), 8);
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }
}
