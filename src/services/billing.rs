//! Subscription state synchronized from Stripe webhook events.

use serde::Serialize;

use crate::domain::organization::{SubscriptionStatus, SubscriptionUpdate};
use crate::domain::types::OrgId;
use crate::integrations::stripe::{StripeEvent, verify_signature};
use crate::repository::{OrganizationReader, OrganizationWriter, StripeEventWriter};
use crate::services::{ServiceError, ServiceResult};

/// What happened to an accepted event.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StripeOutcome {
    Processed,
    /// The event id was seen before; nothing was changed.
    Duplicate,
    /// Unknown event type or organization; acknowledged so Stripe stops retrying.
    Ignored,
}

/// Verifies, deduplicates and applies a Stripe webhook delivery.
///
/// `now` is the current unix time in seconds, used for the signature
/// tolerance window.
pub fn handle_stripe_event<R>(
    repo: &R,
    secret: &str,
    payload: &[u8],
    signature: Option<&str>,
    now: i64,
) -> ServiceResult<StripeOutcome>
where
    R: OrganizationReader + OrganizationWriter + StripeEventWriter + ?Sized,
{
    verify_signature(payload, signature, secret, now).map_err(|err| {
        log::warn!("Rejected Stripe webhook: {err}");
        ServiceError::Form(err.to_string())
    })?;

    let event: StripeEvent = serde_json::from_slice(payload)
        .map_err(|err| ServiceError::Form(format!("invalid Stripe event: {err}")))?;

    if !repo.record_stripe_event(&event.id, &event.event_type)? {
        log::info!("Stripe event {} already processed", event.id);
        return Ok(StripeOutcome::Duplicate);
    }

    apply_event(repo, &event).inspect_err(|_| {
        // Release the id so Stripe's redelivery is applied instead of skipped.
        if let Err(err) = repo.forget_stripe_event(&event.id) {
            log::error!("Failed to release Stripe event {}: {err}", event.id);
        }
    })
}

fn apply_event<R>(repo: &R, event: &StripeEvent) -> ServiceResult<StripeOutcome>
where
    R: OrganizationReader + OrganizationWriter + ?Sized,
{
    match event.event_type.as_str() {
        "checkout.session.completed" => checkout_completed(repo, event),
        "customer.subscription.updated" => subscription_updated(repo, event),
        "customer.subscription.deleted" => subscription_deleted(repo, event),
        other => {
            log::debug!("Ignoring Stripe event type {other}");
            Ok(StripeOutcome::Ignored)
        }
    }
}

fn checkout_completed<R>(repo: &R, event: &StripeEvent) -> ServiceResult<StripeOutcome>
where
    R: OrganizationReader + OrganizationWriter + ?Sized,
{
    let org_id = event
        .object_str("client_reference_id")
        .and_then(|reference| reference.parse::<i32>().ok())
        .and_then(|id| OrgId::new(id).ok());
    let (Some(org_id), Some(customer)) = (org_id, event.object_str("customer")) else {
        log::warn!(
            "Stripe checkout {} lacks an organization reference or customer",
            event.id
        );
        return Ok(StripeOutcome::Ignored);
    };

    if repo.get_organization(org_id)?.is_none() {
        log::warn!("Stripe checkout {} references unknown org {org_id}", event.id);
        return Ok(StripeOutcome::Ignored);
    }

    let update = SubscriptionUpdate {
        stripe_customer_id: Some(customer.to_string()),
        subscription_status: SubscriptionStatus::Active,
        plan: None,
    };
    repo.update_subscription(org_id, &update).map_err(|err| {
        log::error!("Failed to activate subscription for org {org_id}: {err}");
        err
    })?;

    log::info!("Org {org_id} linked to Stripe customer {customer}");
    Ok(StripeOutcome::Processed)
}

fn subscription_updated<R>(repo: &R, event: &StripeEvent) -> ServiceResult<StripeOutcome>
where
    R: OrganizationReader + OrganizationWriter + ?Sized,
{
    let Some(status) = event
        .object_str("status")
        .and_then(SubscriptionStatus::from_provider)
    else {
        log::warn!("Stripe subscription event {} has an unknown status", event.id);
        return Ok(StripeOutcome::Ignored);
    };

    apply_to_customer(repo, event, status, event.subscription_plan())
}

fn subscription_deleted<R>(repo: &R, event: &StripeEvent) -> ServiceResult<StripeOutcome>
where
    R: OrganizationReader + OrganizationWriter + ?Sized,
{
    apply_to_customer(repo, event, SubscriptionStatus::Canceled, None)
}

fn apply_to_customer<R>(
    repo: &R,
    event: &StripeEvent,
    status: SubscriptionStatus,
    plan: Option<&str>,
) -> ServiceResult<StripeOutcome>
where
    R: OrganizationReader + OrganizationWriter + ?Sized,
{
    let Some(customer) = event.object_str("customer") else {
        log::warn!("Stripe event {} has no customer", event.id);
        return Ok(StripeOutcome::Ignored);
    };

    let Some(org) = repo.get_organization_by_customer(customer)? else {
        log::warn!("Stripe customer {customer} is not linked to an organization");
        return Ok(StripeOutcome::Ignored);
    };

    let update = SubscriptionUpdate {
        stripe_customer_id: None,
        subscription_status: status,
        plan: plan.map(str::to_string),
    };
    repo.update_subscription(org.id, &update).map_err(|err| {
        log::error!("Failed to update subscription for org {}: {err}", org.id);
        err
    })?;

    log::info!("Org {} subscription is now {status}", org.id);
    Ok(StripeOutcome::Processed)
}
