//! Lead capture and conversion into clients.

use serde_json::json;

use crate::SERVICE_ACCESS_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::client::NewClient;
use crate::domain::lead::{Lead, LeadStatus};
use crate::domain::types::{LeadId, OrgId};
use crate::domain::webhook::WebhookEvent;
use crate::dto::leads::ConvertedLead;
use crate::forms::FormError;
use crate::forms::leads::{LeadForm, LeadListParams, LeadPayload, LeadStatusForm};
use crate::pagination::{Paginated, clamp_per_page};
use crate::repository::{LeadListQuery, LeadReader, LeadWriter};
use crate::services::{EventPublisher, ServiceError, ServiceResult};

pub fn create_lead<R>(repo: &R, user: &AuthenticatedUser, form: LeadForm) -> ServiceResult<Lead>
where
    R: LeadWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = LeadPayload::try_from(form)?;
    let org_id = OrgId::new(user.org_id)?;

    Ok(repo.create_lead(&payload.into_domain(org_id))?)
}

pub fn list_leads<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: LeadListParams,
) -> ServiceResult<Paginated<Lead>>
where
    R: LeadReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let page = params.page.unwrap_or(1).max(1);
    let per_page = clamp_per_page(params.per_page);

    let mut query = LeadListQuery::new(org_id).paginate(page, per_page);
    if let Some(status) = params.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let status: LeadStatus = status
            .parse()
            .map_err(|_| FormError::InvalidStatus(status.to_string()))?;
        query = query.status(status);
    }

    let (total, leads) = repo.list_leads(query)?;

    Ok(Paginated::new(leads, page, per_page, total))
}

pub fn get_lead<R>(repo: &R, user: &AuthenticatedUser, lead_id: i32) -> ServiceResult<Lead>
where
    R: LeadReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;

    repo.get_lead_by_id(LeadId::new(lead_id)?, org_id)?
        .ok_or(ServiceError::NotFound)
}

/// Manual status change; `Converted` is reserved for [`convert_lead`].
pub fn change_lead_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    lead_id: i32,
    form: LeadStatusForm,
) -> ServiceResult<Lead>
where
    R: LeadReader + LeadWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let next = LeadStatus::try_from(form)?;
    let org_id = OrgId::new(user.org_id)?;

    let lead = repo
        .get_lead_by_id(LeadId::new(lead_id)?, org_id)?
        .ok_or(ServiceError::NotFound)?;

    if !lead.status.can_transition_to(next) {
        return Err(FormError::InvalidTransition {
            from: lead.status.to_string(),
            to: next.to_string(),
        }
        .into());
    }

    Ok(repo.update_lead_status(lead.id, org_id, next)?)
}

/// Turns a lead into a client and links the two.
pub fn convert_lead<R>(
    repo: &R,
    events: &dyn EventPublisher,
    user: &AuthenticatedUser,
    lead_id: i32,
) -> ServiceResult<ConvertedLead>
where
    R: LeadReader + LeadWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;

    let lead = repo
        .get_lead_by_id(LeadId::new(lead_id)?, org_id)?
        .ok_or(ServiceError::NotFound)?;

    if lead.status == LeadStatus::Converted {
        return Err(ServiceError::Conflict(format!(
            "lead {} is already converted",
            lead.id
        )));
    }

    let new_client = NewClient::new(
        org_id,
        lead.name.clone(),
        lead.email.clone(),
        lead.phone.clone(),
        lead.address.clone(),
    );

    let (lead, client) = repo
        .convert_lead(lead.id, org_id, &new_client)
        .map_err(|err| {
            log::error!("Failed to convert lead {}: {err}", lead.id);
            err
        })?;

    events.publish(
        org_id,
        WebhookEvent::LeadConverted,
        json!({ "lead": &lead, "client": &client }),
    );

    Ok(ConvertedLead { lead, client })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::types::{ClientId, ClientName, PhoneNumber};
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        ORG, RecordingPublisher, org, sample_client, ts, viewer_user,
    };

    fn lead(id: i32, status: LeadStatus) -> Lead {
        Lead {
            id: LeadId::new(id).unwrap(),
            org_id: org(),
            name: ClientName::new("Jordan Rivera").unwrap(),
            email: None,
            phone: Some(PhoneNumber::new("+1 214 555 0142").unwrap()),
            address: Some("400 Cedar Ln".to_string()),
            source: Some("door knock".to_string()),
            status,
            notes: None,
            client_id: None,
            created_at: ts(9),
            updated_at: ts(9),
        }
    }

    #[test]
    fn create_lead_requires_contact() {
        let mut repo = MockRepository::new();
        repo.expect_create_lead().times(0);

        let result = create_lead(
            &repo,
            &viewer_user(),
            LeadForm {
                name: "Jordan".into(),
                email: None,
                phone: None,
                address: None,
                source: None,
                notes: None,
            },
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn manual_status_cannot_be_converted() {
        let mut repo = MockRepository::new();
        repo.expect_get_lead_by_id()
            .returning(|id, _| Ok(Some(lead(id.get(), LeadStatus::Qualified))));
        repo.expect_update_lead_status().times(0);

        let result = change_lead_status(
            &repo,
            &viewer_user(),
            1,
            LeadStatusForm {
                status: "Converted".into(),
            },
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn convert_lead_creates_client_and_emits_event() {
        let mut repo = MockRepository::new();
        repo.expect_get_lead_by_id()
            .returning(|id, _| Ok(Some(lead(id.get(), LeadStatus::Qualified))));
        repo.expect_convert_lead()
            .withf(|id, org_id, client| {
                id.get() == 4
                    && org_id.get() == ORG
                    && client.name.as_str() == "Jordan Rivera"
                    && client.address.as_deref() == Some("400 Cedar Ln")
            })
            .times(1)
            .returning(|id, _, _| {
                let mut converted = lead(id.get(), LeadStatus::Converted);
                converted.client_id = Some(ClientId::new(11).unwrap());
                Ok((converted, sample_client(11)))
            });
        let events = RecordingPublisher::default();

        let result = convert_lead(&repo, &events, &viewer_user(), 4).unwrap();

        assert_eq!(result.lead.status, LeadStatus::Converted);
        assert_eq!(result.lead.client_id, Some(result.client.id));
        assert_eq!(events.names(), vec![WebhookEvent::LeadConverted]);
    }

    #[test]
    fn converting_twice_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_lead_by_id()
            .returning(|id, _| Ok(Some(lead(id.get(), LeadStatus::Converted))));
        repo.expect_convert_lead().times(0);
        let events = RecordingPublisher::default();

        let result = convert_lead(&repo, &events, &viewer_user(), 4);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
        assert!(events.names().is_empty());
    }

    #[test]
    fn concurrent_conversion_surfaces_as_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_lead_by_id()
            .returning(|id, _| Ok(Some(lead(id.get(), LeadStatus::New))));
        repo.expect_convert_lead()
            .returning(|_, _, _| Err(RepositoryError::Conflict("already converted".into())));
        let events = RecordingPublisher::default();

        let result = convert_lead(&repo, &events, &viewer_user(), 4);
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }
}
