//! Repair estimates attached to claims.

use serde_json::json;

use crate::SERVICE_ACCESS_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::estimate::{Estimate, EstimateStatus};
use crate::domain::types::{ClaimId, EstimateId, OrgId};
use crate::domain::webhook::WebhookEvent;
use crate::forms::FormError;
use crate::forms::estimates::{EstimateForm, EstimatePayload, EstimateStatusForm};
use crate::repository::{ClaimReader, EstimateReader, EstimateWriter};
use crate::services::claims::load_visible_claim;
use crate::services::{EventPublisher, ServiceError, ServiceResult};

/// Stores an estimate; line and grand totals are computed here, never taken
/// from the request.
pub fn create_estimate<R>(
    repo: &R,
    events: &dyn EventPublisher,
    user: &AuthenticatedUser,
    claim_id: i32,
    form: EstimateForm,
) -> ServiceResult<Estimate>
where
    R: ClaimReader + EstimateWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = EstimatePayload::try_from(form)?;
    let org_id = OrgId::new(user.org_id)?;
    let claim = load_visible_claim(repo, user, ClaimId::new(claim_id)?)?;

    let estimate = repo
        .create_estimate(&payload.into_domain(org_id, claim.id))
        .map_err(|err| {
            log::error!("Failed to create estimate for claim {}: {err}", claim.id);
            err
        })?;

    events.publish(
        org_id,
        WebhookEvent::EstimateCreated,
        json!({ "estimate": &estimate, "claim_number": claim.claim_number }),
    );

    Ok(estimate)
}

pub fn list_estimates<R>(
    repo: &R,
    user: &AuthenticatedUser,
    claim_id: i32,
) -> ServiceResult<Vec<Estimate>>
where
    R: ClaimReader + EstimateReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let claim = load_visible_claim(repo, user, ClaimId::new(claim_id)?)?;

    Ok(repo.list_estimates(claim.id, org_id)?)
}

pub fn get_estimate<R>(repo: &R, user: &AuthenticatedUser, estimate_id: i32) -> ServiceResult<Estimate>
where
    R: ClaimReader + EstimateReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let estimate = repo
        .get_estimate_by_id(EstimateId::new(estimate_id)?, org_id)?
        .ok_or(ServiceError::NotFound)?;
    load_visible_claim(repo, user, estimate.claim_id)?;

    Ok(estimate)
}

/// Moves an estimate through `Draft → Sent → Approved | Rejected`.
pub fn change_estimate_status<R>(
    repo: &R,
    events: &dyn EventPublisher,
    user: &AuthenticatedUser,
    estimate_id: i32,
    form: EstimateStatusForm,
) -> ServiceResult<Estimate>
where
    R: ClaimReader + EstimateReader + EstimateWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let next = EstimateStatus::try_from(form)?;
    let org_id = OrgId::new(user.org_id)?;

    let current = repo
        .get_estimate_by_id(EstimateId::new(estimate_id)?, org_id)?
        .ok_or(ServiceError::NotFound)?;
    load_visible_claim(repo, user, current.claim_id)?;

    if !current.status.can_transition_to(next) {
        return Err(FormError::InvalidTransition {
            from: current.status.to_string(),
            to: next.to_string(),
        }
        .into());
    }

    let estimate = repo.update_estimate_status(current.id, org_id, next)?;

    if estimate.status == EstimateStatus::Approved {
        events.publish(
            org_id,
            WebhookEvent::EstimateApproved,
            json!({ "estimate": &estimate }),
        );
    }

    Ok(estimate)
}
