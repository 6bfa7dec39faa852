//! Insurance claims, their status workflow and timeline.

use serde_json::json;

use crate::SERVICE_ACCESS_ROLE;
use crate::SERVICE_ADMIN_ROLE;
use crate::SERVICE_MANAGER_ROLE;
use crate::auth::{AuthenticatedUser, check_role, ensure_role};
use crate::domain::claim::{Claim, ClaimStatus, NewClaim, UpdateClaim};
use crate::domain::claim_event::{ClaimEvent, ClaimEventType, NewClaimEvent};
use crate::domain::types::{ClaimId, MemberEmail, OrgId, Title};
use crate::domain::webhook::WebhookEvent;
use crate::dto::claims::{ClaimDetail, TimelineEntry};
use crate::forms::FormError;
use crate::forms::claims::{
    AddClaimEventForm, AddClaimEventPayload, ChangeStatusForm, ChangeStatusPayload, ClaimListParams,
    NewClaimForm, NewClaimPayload, TimelineParams, UpdateClaimForm,
};
use crate::integrations::mailer::Mailer;
use crate::pagination::{Paginated, clamp_per_page};
use crate::repository::{
    ClaimEventListQuery, ClaimEventReader, ClaimEventWriter, ClaimListQuery, ClaimReader,
    ClaimWriter, ClientReader, EstimateReader, MemberReader, MemberWriter, NotificationWriter,
    PropertyReader,
};
use crate::services::members::current_member;
use crate::services::notifications::notify_members;
use crate::services::{EventPublisher, ServiceError, ServiceResult};

/// Managers without admin rights only see the claims assigned to them.
pub(crate) fn restricted_to_assigned(user: &AuthenticatedUser) -> bool {
    check_role(SERVICE_MANAGER_ROLE, &user.roles) && !check_role(SERVICE_ADMIN_ROLE, &user.roles)
}

/// Loads a claim of the caller's organization that the caller may see.
///
/// Claims hidden from a restricted manager are reported as missing.
pub(crate) fn load_visible_claim<R>(
    repo: &R,
    user: &AuthenticatedUser,
    claim_id: ClaimId,
) -> ServiceResult<Claim>
where
    R: ClaimReader + ?Sized,
{
    let org_id = OrgId::new(user.org_id)?;

    let claim = repo
        .get_claim_by_id(claim_id, org_id)?
        .ok_or(ServiceError::NotFound)?;

    if restricted_to_assigned(user) {
        let email = MemberEmail::new(user.email.clone())?;
        if !repo.check_claim_assigned_to_member(claim_id, org_id, &email)? {
            return Err(ServiceError::NotFound);
        }
    }

    Ok(claim)
}

fn validate_links<R>(repo: &R, claim: &NewClaim) -> ServiceResult<()>
where
    R: ClientReader + PropertyReader + ?Sized,
{
    if repo.get_client_by_id(claim.client_id, claim.org_id)?.is_none() {
        return Err(ServiceError::Form(format!("unknown client {}", claim.client_id)));
    }
    if let Some(property_id) = claim.property_id {
        match repo.get_property_by_id(property_id, claim.org_id)? {
            Some(property) if property.client_id == claim.client_id => {}
            _ => {
                return Err(ServiceError::Form(format!(
                    "property {property_id} does not belong to client {}",
                    claim.client_id
                )));
            }
        }
    }
    Ok(())
}

pub fn create_claim<R>(
    repo: &R,
    events: &dyn EventPublisher,
    user: &AuthenticatedUser,
    form: NewClaimForm,
) -> ServiceResult<Claim>
where
    R: ClaimWriter + ClientReader + PropertyReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = NewClaimPayload::try_from(form)?;
    let org_id = OrgId::new(user.org_id)?;
    let new_claim = payload.into_domain(org_id);

    validate_links(repo, &new_claim)?;

    let claim = repo.create_claim(&new_claim).map_err(|err| {
        log::error!("Failed to create claim {}: {err}", new_claim.claim_number);
        err
    })?;

    events.publish(org_id, WebhookEvent::ClaimCreated, json!({ "claim": &claim }));

    Ok(claim)
}

/// Loads a claim with its client, property, assignees and estimates.
pub fn get_claim<R>(repo: &R, user: &AuthenticatedUser, claim_id: i32) -> ServiceResult<ClaimDetail>
where
    R: ClaimReader + ClientReader + PropertyReader + MemberReader + EstimateReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let claim = load_visible_claim(repo, user, ClaimId::new(claim_id)?)?;

    let client = repo.get_client_by_id(claim.client_id, org_id)?;
    let property = match claim.property_id {
        Some(property_id) => repo.get_property_by_id(property_id, org_id)?,
        None => None,
    };
    let assignees = repo.list_claim_assignees(claim.id, org_id)?;
    let estimates = repo.list_estimates(claim.id, org_id)?;

    Ok(ClaimDetail {
        claim,
        client,
        property,
        assignees,
        estimates,
    })
}

pub fn list_claims<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: ClaimListParams,
) -> ServiceResult<Paginated<Claim>>
where
    R: ClaimReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let page = params.page.unwrap_or(1).max(1);
    let per_page = clamp_per_page(params.per_page);

    let mut query = ClaimListQuery::new(org_id).paginate(page, per_page);

    if let Some(status) = params.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let status: ClaimStatus = status
            .parse()
            .map_err(|_| FormError::InvalidStatus(status.to_string()))?;
        query = query.status(status);
    }
    if let Some(term) = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        query = query.search(term);
    }
    if restricted_to_assigned(user) {
        query = query.assigned_to(MemberEmail::new(user.email.clone())?);
    }

    let (total, claims) = repo.list_claims(query).map_err(|err| {
        log::error!("Failed to list claims: {err}");
        err
    })?;

    Ok(Paginated::new(claims, page, per_page, total))
}

pub fn update_claim<R>(
    repo: &R,
    events: &dyn EventPublisher,
    user: &AuthenticatedUser,
    claim_id: i32,
    form: UpdateClaimForm,
) -> ServiceResult<Claim>
where
    R: ClaimReader + ClaimWriter + PropertyReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let updates = UpdateClaim::try_from(form)?;
    let org_id = OrgId::new(user.org_id)?;
    let current = load_visible_claim(repo, user, ClaimId::new(claim_id)?)?;

    if let Some(property_id) = updates.property_id {
        match repo.get_property_by_id(property_id, org_id)? {
            Some(property) if property.client_id == current.client_id => {}
            _ => {
                return Err(ServiceError::Form(format!(
                    "property {property_id} does not belong to the claim's client"
                )));
            }
        }
    }

    let claim = repo.update_claim(current.id, org_id, &updates)?;

    events.publish(org_id, WebhookEvent::ClaimUpdated, json!({ "claim": &claim }));

    Ok(claim)
}

/// Moves a claim along its workflow, logs the change and tells the assignees.
pub fn change_status<R>(
    repo: &R,
    events: &dyn EventPublisher,
    mailer: &dyn Mailer,
    user: &AuthenticatedUser,
    claim_id: i32,
    form: ChangeStatusForm,
) -> ServiceResult<Claim>
where
    R: ClaimReader
        + ClaimWriter
        + ClaimEventWriter
        + MemberReader
        + MemberWriter
        + NotificationWriter
        + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = ChangeStatusPayload::try_from(form)?;
    let org_id = OrgId::new(user.org_id)?;
    let current = load_visible_claim(repo, user, ClaimId::new(claim_id)?)?;

    let from = current.status;
    let to = payload.status;
    if !from.can_transition_to(to) {
        return Err(FormError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
        .into());
    }

    let member = current_member(repo, user)?;
    let claim = repo.update_claim_status(current.id, org_id, to)?;

    let note = payload.note.map(|note| note.into_inner());
    repo.create_claim_event(
        &NewClaimEvent::new(
            claim.id,
            member.id,
            ClaimEventType::StatusChange,
            json!({ "from": from, "to": to, "note": note }),
        ),
        org_id,
    )
    .map_err(|err| {
        log::error!("Failed to log status change of claim {}: {err}", claim.id);
        err
    })?;

    events.publish(
        org_id,
        WebhookEvent::ClaimStatusChanged,
        json!({ "claim": &claim, "from": from, "to": to }),
    );

    let recipients: Vec<_> = repo
        .list_claim_assignees(claim.id, org_id)?
        .into_iter()
        .filter(|assignee| assignee.id != member.id)
        .collect();
    if !recipients.is_empty() {
        let title = Title::new(format!("Claim {} is now {to}", claim.claim_number))?;
        let body = note.unwrap_or_default();
        let link = format!("/claims/{}", claim.id);
        notify_members(repo, mailer, org_id, &recipients, &title, &body, Some(&link));
    }

    Ok(claim)
}

/// Adds a manual entry (note, call, email...) to the claim timeline.
pub fn add_event<R>(
    repo: &R,
    user: &AuthenticatedUser,
    claim_id: i32,
    form: AddClaimEventForm,
) -> ServiceResult<ClaimEvent>
where
    R: ClaimReader + ClaimEventWriter + MemberReader + MemberWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = AddClaimEventPayload::try_from(form)?;
    let org_id = OrgId::new(user.org_id)?;
    let claim = load_visible_claim(repo, user, ClaimId::new(claim_id)?)?;
    let member = current_member(repo, user)?;

    let event = repo.create_claim_event(
        &NewClaimEvent::new(
            claim.id,
            member.id,
            payload.event_type,
            json!({ "text": payload.text.as_str() }),
        ),
        org_id,
    )?;

    Ok(event)
}

pub fn timeline<R>(
    repo: &R,
    user: &AuthenticatedUser,
    claim_id: i32,
    params: TimelineParams,
) -> ServiceResult<Paginated<TimelineEntry>>
where
    R: ClaimReader + ClaimEventReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let claim = load_visible_claim(repo, user, ClaimId::new(claim_id)?)?;
    let page = params.page.unwrap_or(1).max(1);
    let per_page = clamp_per_page(params.per_page);

    let mut query = ClaimEventListQuery::new(org_id, claim.id).paginate(page, per_page);
    if let Some(event_type) = params
        .event_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        query = query.event_type(ClaimEventType::from(event_type));
    }

    let (total, events) = repo.list_claim_events(query)?;
    let entries = events.into_iter().map(TimelineEntry::from).collect();

    Ok(Paginated::new(entries, page, per_page, total))
}
