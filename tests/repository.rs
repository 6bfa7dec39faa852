use chrono::{NaiveDate, NaiveDateTime};
use stormdesk::domain::claim::{Claim, ClaimStatus, DamageType, NewClaim};
use stormdesk::domain::client::{Client, NewClient};
use stormdesk::domain::depreciation::{AgeYears, DepreciationStatus, NewDepreciationItem};
use stormdesk::domain::job::{JobStatus, NewJob, TimeWindow};
use stormdesk::domain::lead::{LeadStatus, NewLead};
use stormdesk::domain::member::NewMember;
use stormdesk::domain::types::{
    CarrierName, Cents, ClaimNumber, ClientName, LineDescription, MemberEmail, OrgId, Rate, Title,
    WebUrl,
};
use stormdesk::domain::webhook::{
    DeliveryOutcome, MAX_CONSECUTIVE_FAILURES, NewWebhook, NewWebhookDelivery, WebhookEvent,
};
use stormdesk::repository::errors::RepositoryError;
use stormdesk::repository::{
    ClaimListQuery, ClaimReader, ClaimWriter, ClientListQuery, ClientReader, ClientWriter,
    DepreciationReader, DepreciationWriter, DieselRepository, JobReader, JobWriter, LeadReader,
    LeadWriter, MemberReader, MemberWriter, StripeEventWriter, WebhookReader, WebhookWriter,
};

mod common;

fn org(id: i32) -> OrgId {
    OrgId::new(id).unwrap()
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 6, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap()
}

fn client(repo: &DieselRepository, org_id: i32, name: &str) -> Client {
    repo.create_client(&NewClient::new(
        org(org_id),
        ClientName::new(name).unwrap(),
        None,
        None,
        Some("12 Elm St".to_string()),
    ))
    .unwrap()
}

fn claim(repo: &DieselRepository, org_id: i32, client: &Client, number: &str) -> Claim {
    repo.create_claim(&NewClaim {
        org_id: org(org_id),
        client_id: client.id,
        property_id: None,
        claim_number: ClaimNumber::new(number).unwrap(),
        carrier: CarrierName::new("Lone Star Mutual").unwrap(),
        policy_number: Some("POL-1".to_string()),
        damage_type: DamageType::Hail,
        date_of_loss: NaiveDate::from_ymd_opt(2026, 5, 20),
        description: Some("Hail damage on north slope".to_string()),
    })
    .unwrap()
}

#[test]
fn test_tenants_cannot_read_each_others_rows() {
    let test_db = common::TestDb::new("test_tenants_cannot_read_each_others_rows.db");
    let repo = test_db.repo();
    common::seed_org(&repo, 1, "Summit Roofing");
    common::seed_org(&repo, 2, "Peak Exteriors");

    let owner = client(&repo, 1, "Pat Rivers");
    let stored = claim(&repo, 1, &owner, "CLM-100");

    assert!(repo.get_claim_by_id(stored.id, org(1)).unwrap().is_some());
    assert!(repo.get_claim_by_id(stored.id, org(2)).unwrap().is_none());
    assert!(repo.get_client_by_id(owner.id, org(2)).unwrap().is_none());

    let (total, _) = repo.list_claims(ClaimListQuery::new(org(2))).unwrap();
    assert_eq!(total, 0);
    let (total, _) = repo.list_clients(ClientListQuery::new(org(2))).unwrap();
    assert_eq!(total, 0);

    // A claim in org 2 may not point at org 1's client.
    let result = repo.create_claim(&NewClaim {
        org_id: org(2),
        client_id: owner.id,
        property_id: None,
        claim_number: ClaimNumber::new("CLM-200").unwrap(),
        carrier: CarrierName::new("Lone Star Mutual").unwrap(),
        policy_number: None,
        damage_type: DamageType::Wind,
        date_of_loss: None,
        description: None,
    });
    assert!(matches!(result, Err(RepositoryError::NotFound)));

    assert!(matches!(
        repo.update_claim_status(stored.id, org(2), ClaimStatus::Inspected),
        Err(RepositoryError::NotFound)
    ));
    assert!(repo.delete_client(owner.id, org(2)).is_err());
    assert!(repo.get_client_by_id(owner.id, org(1)).unwrap().is_some());
}

#[test]
fn test_claim_list_filters_by_assignee() {
    let test_db = common::TestDb::new("test_claim_list_filters_by_assignee.db");
    let repo = test_db.repo();
    common::seed_org(&repo, 1, "Summit Roofing");

    let owner = client(&repo, 1, "Pat Rivers");
    let first = claim(&repo, 1, &owner, "CLM-1");
    claim(&repo, 1, &owner, "CLM-2");

    let adjuster = repo
        .create_or_update_member(&NewMember::try_new(1, "Sam Hale", "sam@summit.test", true).unwrap())
        .unwrap();
    assert_eq!(
        repo.assign_members_to_claim(first.id, org(1), &[adjuster.id])
            .unwrap(),
        1
    );

    let email = MemberEmail::new("sam@summit.test").unwrap();
    let (total, items) = repo
        .list_claims(ClaimListQuery::new(org(1)).assigned_to(email.clone()))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, first.id);

    assert!(
        repo.check_claim_assigned_to_member(first.id, org(1), &email)
            .unwrap()
    );
    let assignees = repo.list_claim_assignees(first.id, org(1)).unwrap();
    assert_eq!(assignees.len(), 1);
    assert_eq!(assignees[0].email, email);

    let (total, _) = repo
        .list_claims(ClaimListQuery::new(org(1)).search("CLM-2"))
        .unwrap();
    assert_eq!(total, 1);
}

#[test]
fn test_lead_converts_exactly_once() {
    let test_db = common::TestDb::new("test_lead_converts_exactly_once.db");
    let repo = test_db.repo();
    common::seed_org(&repo, 1, "Summit Roofing");

    let lead = repo
        .create_lead(&NewLead {
            org_id: org(1),
            name: ClientName::new("Jordan Vale").unwrap(),
            email: None,
            phone: None,
            address: Some("4 Oak Ct".to_string()),
            source: Some("canvassing".to_string()),
            notes: None,
        })
        .unwrap();
    assert_eq!(lead.status, LeadStatus::New);

    let new_client = NewClient::new(
        org(1),
        lead.name.clone(),
        None,
        None,
        lead.address.clone(),
    );

    let (converted, created) = repo.convert_lead(lead.id, org(1), &new_client).unwrap();
    assert_eq!(converted.status, LeadStatus::Converted);
    assert_eq!(converted.client_id, Some(created.id));

    let again = repo.convert_lead(lead.id, org(1), &new_client);
    assert!(matches!(again, Err(RepositoryError::Conflict(_))));

    let (total, _) = repo.list_clients(ClientListQuery::new(org(1))).unwrap();
    assert_eq!(total, 1);

    let stored = repo.get_lead_by_id(lead.id, org(1)).unwrap().unwrap();
    assert_eq!(stored.status, LeadStatus::Converted);
}

#[test]
fn test_crew_conflicts_ignore_cancelled_and_adjacent_jobs() {
    let test_db = common::TestDb::new("test_crew_conflicts.db");
    let repo = test_db.repo();
    common::seed_org(&repo, 1, "Summit Roofing");

    let owner = client(&repo, 1, "Pat Rivers");
    let stored = claim(&repo, 1, &owner, "CLM-1");

    let morning = repo
        .create_job(&NewJob {
            org_id: org(1),
            claim_id: stored.id,
            title: Title::new("Tear off").unwrap(),
            crew: Some("Crew A".to_string()),
            window: TimeWindow::new(at(10, 8), at(10, 12)).unwrap(),
            notes: None,
        })
        .unwrap();
    assert_eq!(morning.status, JobStatus::Scheduled);

    let overlapping = TimeWindow::new(at(10, 11), at(10, 15)).unwrap();
    let adjacent = TimeWindow::new(at(10, 12), at(10, 16)).unwrap();

    let conflicts = repo
        .find_crew_conflicts(org(1), "Crew A", &overlapping, None)
        .unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].id, morning.id);

    assert!(
        repo.find_crew_conflicts(org(1), "Crew A", &adjacent, None)
            .unwrap()
            .is_empty()
    );
    assert!(
        repo.find_crew_conflicts(org(1), "Crew B", &overlapping, None)
            .unwrap()
            .is_empty()
    );
    assert!(
        repo.find_crew_conflicts(org(1), "Crew A", &overlapping, Some(morning.id))
            .unwrap()
            .is_empty()
    );

    repo.update_job_status(morning.id, org(1), JobStatus::Cancelled)
        .unwrap();
    assert!(
        repo.find_crew_conflicts(org(1), "Crew A", &overlapping, None)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_webhook_is_disabled_after_consecutive_failures() {
    let test_db = common::TestDb::new("test_webhook_is_disabled.db");
    let repo = test_db.repo();
    common::seed_org(&repo, 1, "Summit Roofing");

    let webhook = repo
        .create_webhook(
            &NewWebhook::new(
                org(1),
                WebUrl::new("https://hooks.example.com/storm").unwrap(),
                vec![WebhookEvent::ClaimCreated],
            )
            .unwrap(),
        )
        .unwrap();
    assert!(webhook.is_active);

    let subscribed = repo
        .list_webhooks_for_event(org(1), WebhookEvent::ClaimCreated)
        .unwrap();
    assert_eq!(subscribed.len(), 1);
    assert!(
        repo.list_webhooks_for_event(org(1), WebhookEvent::JobScheduled)
            .unwrap()
            .is_empty()
    );

    let delivery = repo
        .create_delivery(&NewWebhookDelivery {
            webhook_id: webhook.id,
            event: WebhookEvent::ClaimCreated,
            payload: "{}".to_string(),
        })
        .unwrap();
    repo.finish_delivery(
        delivery.id,
        &DeliveryOutcome {
            succeeded: false,
            attempts: 3,
            response_status: Some(503),
            last_error: Some("service unavailable".to_string()),
        },
    )
    .unwrap();
    assert_eq!(repo.list_failed_deliveries(10).unwrap().len(), 1);

    for _ in 1..MAX_CONSECUTIVE_FAILURES {
        assert!(repo.record_webhook_failure(webhook.id).unwrap().is_active);
    }
    let disabled = repo.record_webhook_failure(webhook.id).unwrap();
    assert!(!disabled.is_active);
    assert_eq!(disabled.failure_count, MAX_CONSECUTIVE_FAILURES);

    // Disabled webhooks are neither notified nor retried.
    assert!(
        repo.list_webhooks_for_event(org(1), WebhookEvent::ClaimCreated)
            .unwrap()
            .is_empty()
    );
    assert!(repo.list_failed_deliveries(10).unwrap().is_empty());

    let enabled = repo.enable_webhook(webhook.id, org(1)).unwrap();
    assert!(enabled.is_active);
    assert_eq!(enabled.failure_count, 0);

    assert!(matches!(
        repo.enable_webhook(webhook.id, org(2)),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_permanently_rejected_deliveries_are_not_retried() {
    let test_db = common::TestDb::new("test_permanently_rejected_deliveries.db");
    let repo = test_db.repo();
    common::seed_org(&repo, 1, "Summit Roofing");

    let webhook = repo
        .create_webhook(
            &NewWebhook::new(
                org(1),
                WebUrl::new("https://hooks.example.com/storm").unwrap(),
                vec![WebhookEvent::ClaimCreated],
            )
            .unwrap(),
        )
        .unwrap();

    let mut retryable = Vec::new();
    for status in [Some(410), Some(400), Some(503), Some(429), None] {
        let delivery = repo
            .create_delivery(&NewWebhookDelivery {
                webhook_id: webhook.id,
                event: WebhookEvent::ClaimCreated,
                payload: "{}".to_string(),
            })
            .unwrap();
        repo.finish_delivery(
            delivery.id,
            &DeliveryOutcome {
                succeeded: false,
                attempts: 3,
                response_status: status,
                last_error: Some("delivery failed".to_string()),
            },
        )
        .unwrap();
        if !matches!(status, Some(400) | Some(410)) {
            retryable.push(delivery.id);
        }
    }

    let listed: Vec<_> = repo
        .list_failed_deliveries(10)
        .unwrap()
        .into_iter()
        .map(|(delivery, _)| delivery.id)
        .collect();
    assert_eq!(listed, retryable);
}

#[test]
fn test_stripe_events_are_recorded_once() {
    let test_db = common::TestDb::new("test_stripe_events_are_recorded_once.db");
    let repo = test_db.repo();

    assert!(
        repo.record_stripe_event("evt_1", "customer.subscription.updated")
            .unwrap()
    );
    assert!(
        !repo
            .record_stripe_event("evt_1", "customer.subscription.updated")
            .unwrap()
    );
    assert!(
        repo.record_stripe_event("evt_2", "customer.subscription.deleted")
            .unwrap()
    );

    // A released id is accepted again.
    repo.forget_stripe_event("evt_1").unwrap();
    assert!(
        repo.record_stripe_event("evt_1", "customer.subscription.updated")
            .unwrap()
    );
}

#[test]
fn test_depreciation_transitions_are_logged() {
    let test_db = common::TestDb::new("test_depreciation_transitions_are_logged.db");
    let repo = test_db.repo();
    common::seed_org(&repo, 1, "Summit Roofing");

    let owner = client(&repo, 1, "Pat Rivers");
    let stored = claim(&repo, 1, &owner, "CLM-1");

    let item = repo
        .create_depreciation_item(&NewDepreciationItem {
            org_id: org(1),
            claim_id: stored.id,
            description: LineDescription::new("Architectural shingles").unwrap(),
            original_value: Cents::new(10_000).unwrap(),
            annual_rate: Rate::new(0.05).unwrap(),
            age: AgeYears::new(10.0).unwrap(),
        })
        .unwrap();
    assert_eq!(item.status, DepreciationStatus::Calculated);

    let requested = repo
        .transition_depreciation_item(
            item.id,
            org(1),
            DepreciationStatus::Calculated,
            DepreciationStatus::Requested,
            Some("Sent with completion photos".to_string()),
        )
        .unwrap();
    assert_eq!(requested.status, DepreciationStatus::Requested);

    // A writer holding a stale status loses.
    let stale = repo.transition_depreciation_item(
        item.id,
        org(1),
        DepreciationStatus::Calculated,
        DepreciationStatus::Requested,
        None,
    );
    assert!(matches!(stale, Err(RepositoryError::NotFound)));

    let events = repo.list_depreciation_events(item.id, org(1)).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].from_status, None);
    assert_eq!(events[0].to_status, DepreciationStatus::Calculated);
    assert_eq!(events[1].from_status, Some(DepreciationStatus::Calculated));
    assert_eq!(events[1].to_status, DepreciationStatus::Requested);
    assert!(events[0].id < events[1].id);
    assert_eq!(
        events[1].note.as_deref(),
        Some("Sent with completion photos")
    );

    assert!(
        repo.list_depreciation_events(item.id, org(2))
            .unwrap()
            .is_empty()
    );
    assert!(
        repo.get_depreciation_item(item.id, org(2))
            .unwrap()
            .is_none()
    );
}
