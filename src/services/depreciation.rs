//! Recoverable depreciation items and their recovery workflow.

use serde_json::json;

use crate::SERVICE_ACCESS_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::depreciation::DepreciationItem;
use crate::domain::types::{ClaimId, DepreciationItemId, OrgId};
use crate::domain::webhook::WebhookEvent;
use crate::dto::depreciation::{DepreciationHistory, DepreciationItemView, DepreciationSummary};
use crate::forms::FormError;
use crate::forms::depreciation::{
    DepreciationItemForm, DepreciationItemPayload, DepreciationTransitionForm,
    DepreciationTransitionPayload,
};
use crate::repository::{ClaimReader, DepreciationReader, DepreciationWriter};
use crate::services::claims::load_visible_claim;
use crate::services::{EventPublisher, ServiceError, ServiceResult};

pub fn create_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    claim_id: i32,
    form: DepreciationItemForm,
) -> ServiceResult<DepreciationItemView>
where
    R: ClaimReader + DepreciationWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = DepreciationItemPayload::try_from(form)?;
    let org_id = OrgId::new(user.org_id)?;
    let claim = load_visible_claim(repo, user, ClaimId::new(claim_id)?)?;

    let item = repo
        .create_depreciation_item(&payload.into_domain(org_id, claim.id))
        .map_err(|err| {
            log::error!("Failed to add depreciation item to claim {}: {err}", claim.id);
            err
        })?;

    Ok(item.into())
}

/// Items of a claim with per-item and total recoverable amounts.
pub fn list_items<R>(
    repo: &R,
    user: &AuthenticatedUser,
    claim_id: i32,
) -> ServiceResult<DepreciationSummary>
where
    R: ClaimReader + DepreciationReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let claim = load_visible_claim(repo, user, ClaimId::new(claim_id)?)?;

    let items = repo.list_depreciation_items(claim.id, org_id)?;

    Ok(DepreciationSummary::new(items))
}

fn load_item<R>(
    repo: &R,
    user: &AuthenticatedUser,
    item_id: i32,
) -> ServiceResult<DepreciationItem>
where
    R: ClaimReader + DepreciationReader + ?Sized,
{
    let org_id = OrgId::new(user.org_id)?;

    let item = repo
        .get_depreciation_item(DepreciationItemId::new(item_id)?, org_id)?
        .ok_or(ServiceError::NotFound)?;
    load_visible_claim(repo, user, item.claim_id)?;

    Ok(item)
}

pub fn item_history<R>(
    repo: &R,
    user: &AuthenticatedUser,
    item_id: i32,
) -> ServiceResult<DepreciationHistory>
where
    R: ClaimReader + DepreciationReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let item = load_item(repo, user, item_id)?;
    let events = repo.list_depreciation_events(item.id, item.org_id)?;

    Ok(DepreciationHistory {
        item: item.into(),
        events,
    })
}

/// Advances an item through the recovery workflow and logs the change.
pub fn transition_item<R>(
    repo: &R,
    events: &dyn EventPublisher,
    user: &AuthenticatedUser,
    item_id: i32,
    form: DepreciationTransitionForm,
) -> ServiceResult<DepreciationItemView>
where
    R: ClaimReader + DepreciationReader + DepreciationWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = DepreciationTransitionPayload::try_from(form)?;
    let current = load_item(repo, user, item_id)?;

    if !current.status.can_transition_to(payload.status) {
        return Err(FormError::InvalidTransition {
            from: current.status.to_string(),
            to: payload.status.to_string(),
        }
        .into());
    }

    let item = repo
        .transition_depreciation_item(
            current.id,
            current.org_id,
            current.status,
            payload.status,
            payload.note.map(|note| note.into_inner()),
        )
        .map_err(|err| {
            log::error!("Failed to move depreciation item {}: {err}", current.id);
            err
        })?;

    events.publish(
        item.org_id,
        WebhookEvent::DepreciationUpdated,
        json!({ "item": &item, "from": current.status, "to": item.status }),
    );

    Ok(item.into())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::claim::ClaimStatus;
    use crate::domain::depreciation::{AgeYears, DepreciationEvent, DepreciationStatus};
    use crate::domain::types::{Cents, DepreciationEventId, LineDescription, Rate};
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        ORG, RecordingPublisher, org, sample_claim, ts, viewer_user,
    };

    fn item(id: i32, status: DepreciationStatus) -> DepreciationItem {
        DepreciationItem {
            id: DepreciationItemId::new(id).unwrap(),
            org_id: org(),
            claim_id: ClaimId::new(1).unwrap(),
            description: LineDescription::new("Architectural shingles").unwrap(),
            original_value: Cents::new(10_000).unwrap(),
            annual_rate: Rate::new(0.05).unwrap(),
            age: AgeYears::new(10.0).unwrap(),
            status,
            created_at: ts(9),
            updated_at: ts(9),
        }
    }

    fn transition(status: &str) -> DepreciationTransitionForm {
        DepreciationTransitionForm {
            status: status.to_string(),
            note: Some("Sent with completion photos".to_string()),
        }
    }

    #[test]
    fn list_reports_recoverable_totals() {
        let mut repo = MockRepository::new();
        repo.expect_get_claim_by_id()
            .returning(|id, _| Ok(Some(sample_claim(id.get(), ClaimStatus::Approved))));
        repo.expect_list_depreciation_items()
            .withf(|claim_id, org_id| claim_id.get() == 1 && org_id.get() == ORG)
            .returning(|_, _| {
                Ok(vec![
                    item(1, DepreciationStatus::Calculated),
                    item(2, DepreciationStatus::Requested),
                ])
            });

        let summary = list_items(&repo, &viewer_user(), 1).unwrap();
        assert_eq!(summary.items.len(), 2);
        assert_eq!(summary.total_original.get(), 20_000);
        assert_eq!(summary.total_current.get(), 2 * 5_987);
        assert_eq!(summary.total_recoverable.get(), 2 * 4_013);
    }

    #[test]
    fn valid_transition_is_logged_and_published() {
        let mut repo = MockRepository::new();
        repo.expect_get_depreciation_item()
            .returning(|id, _| Ok(Some(item(id.get(), DepreciationStatus::Calculated))));
        repo.expect_get_claim_by_id()
            .returning(|id, _| Ok(Some(sample_claim(id.get(), ClaimStatus::Approved))));
        repo.expect_transition_depreciation_item()
            .withf(|id, _, from, to, note| {
                id.get() == 4
                    && *from == DepreciationStatus::Calculated
                    && *to == DepreciationStatus::Requested
                    && note.as_deref() == Some("Sent with completion photos")
            })
            .times(1)
            .returning(|id, _, _, to, _| Ok(item(id.get(), to)));
        let events = RecordingPublisher::default();

        let view = transition_item(&repo, &events, &viewer_user(), 4, transition("Requested"))
            .unwrap();

        assert_eq!(view.item.status, DepreciationStatus::Requested);
        assert_eq!(events.names(), vec![WebhookEvent::DepreciationUpdated]);
    }

    #[test]
    fn skipping_request_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_depreciation_item()
            .returning(|id, _| Ok(Some(item(id.get(), DepreciationStatus::Calculated))));
        repo.expect_get_claim_by_id()
            .returning(|id, _| Ok(Some(sample_claim(id.get(), ClaimStatus::Approved))));
        repo.expect_transition_depreciation_item().times(0);
        let events = RecordingPublisher::default();

        let result = transition_item(&repo, &events, &viewer_user(), 4, transition("Received"));
        assert!(matches!(result, Err(ServiceError::Form(_))));
        assert!(events.names().is_empty());
    }

    #[test]
    fn concurrent_transition_surfaces_as_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_depreciation_item()
            .returning(|id, _| Ok(Some(item(id.get(), DepreciationStatus::Requested))));
        repo.expect_get_claim_by_id()
            .returning(|id, _| Ok(Some(sample_claim(id.get(), ClaimStatus::Approved))));
        repo.expect_transition_depreciation_item()
            .returning(|_, _, _, _, _| Err(RepositoryError::NotFound));
        let events = RecordingPublisher::default();

        let result = transition_item(&repo, &events, &viewer_user(), 4, transition("Approved"));
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn history_lists_events() {
        let mut repo = MockRepository::new();
        repo.expect_get_depreciation_item()
            .returning(|id, _| Ok(Some(item(id.get(), DepreciationStatus::Requested))));
        repo.expect_get_claim_by_id()
            .returning(|id, _| Ok(Some(sample_claim(id.get(), ClaimStatus::Approved))));
        repo.expect_list_depreciation_events().returning(|item_id, _| {
            Ok(vec![DepreciationEvent {
                id: DepreciationEventId::new(1).unwrap(),
                item_id,
                from_status: Some(DepreciationStatus::Calculated),
                to_status: DepreciationStatus::Requested,
                note: None,
                created_at: ts(10),
            }])
        });

        let history = item_history(&repo, &viewer_user(), 4).unwrap();
        assert_eq!(history.events.len(), 1);
        assert_eq!(history.item.item.id.get(), 4);
    }
}
