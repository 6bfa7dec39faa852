//! Crew scheduling.

use serde_json::json;

use crate::SERVICE_ACCESS_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::job::{Job, JobStatus};
use crate::domain::types::{ClaimId, JobId, MemberEmail, OrgId};
use crate::domain::webhook::WebhookEvent;
use crate::forms::FormError;
use crate::forms::jobs::{JobForm, JobPayload, JobRangeParams, JobStatusForm};
use crate::repository::{ClaimReader, JobListQuery, JobReader, JobWriter};
use crate::services::claims::{load_visible_claim, restricted_to_assigned};
use crate::services::{EventPublisher, ServiceError, ServiceResult};

/// Jobs starting inside the requested range, ordered by start.
///
/// Restricted managers only see jobs on claims assigned to them.
pub fn list_jobs<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: JobRangeParams,
) -> ServiceResult<Vec<Job>>
where
    R: JobReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;

    if matches!((params.from, params.to), (Some(from), Some(to)) if to <= from) {
        return Err(ServiceError::Form("`to` must be after `from`".to_string()));
    }

    let mut query = JobListQuery::new(org_id).range(params.from, params.to);
    if let Some(claim_id) = params.claim_id {
        query = query.claim(ClaimId::new(claim_id)?);
    }
    if restricted_to_assigned(user) {
        query = query.assigned_to(MemberEmail::new(user.email.clone())?);
    }

    Ok(repo.list_jobs(query)?)
}

/// Schedules a job, refusing windows that overlap another job of the same crew.
pub fn create_job<R>(
    repo: &R,
    events: &dyn EventPublisher,
    user: &AuthenticatedUser,
    form: JobForm,
) -> ServiceResult<Job>
where
    R: ClaimReader + JobReader + JobWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = JobPayload::try_from(form)?;
    let org_id = OrgId::new(user.org_id)?;
    let claim = load_visible_claim(repo, user, payload.claim_id)?;

    if let Some(crew) = payload.crew.as_deref() {
        let conflicts = repo.find_crew_conflicts(org_id, crew, &payload.window, None)?;
        if let Some(first) = conflicts.first() {
            return Err(ServiceError::Conflict(format!(
                "crew {crew} is already booked for job {} from {} to {}",
                first.id, first.window.start, first.window.end
            )));
        }
    }

    let job = repo.create_job(&payload.into_domain(org_id)).map_err(|err| {
        log::error!("Failed to schedule job for claim {}: {err}", claim.id);
        err
    })?;

    events.publish(
        org_id,
        WebhookEvent::JobScheduled,
        json!({ "job": &job, "claim_number": claim.claim_number }),
    );

    Ok(job)
}

/// Loads a job whose claim is visible to the caller.
fn load_visible_job<R>(repo: &R, user: &AuthenticatedUser, job_id: i32) -> ServiceResult<Job>
where
    R: ClaimReader + JobReader + ?Sized,
{
    let org_id = OrgId::new(user.org_id)?;

    let job = repo
        .get_job_by_id(JobId::new(job_id)?, org_id)?
        .ok_or(ServiceError::NotFound)?;
    load_visible_claim(repo, user, job.claim_id)?;

    Ok(job)
}

pub fn get_job<R>(repo: &R, user: &AuthenticatedUser, job_id: i32) -> ServiceResult<Job>
where
    R: ClaimReader + JobReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    load_visible_job(repo, user, job_id)
}

pub fn change_job_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    job_id: i32,
    form: JobStatusForm,
) -> ServiceResult<Job>
where
    R: ClaimReader + JobReader + JobWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let next = JobStatus::try_from(form)?;
    let job = load_visible_job(repo, user, job_id)?;

    if !job.status.can_transition_to(next) {
        return Err(FormError::InvalidTransition {
            from: job.status.to_string(),
            to: next.to_string(),
        }
        .into());
    }

    Ok(repo.update_job_status(job.id, job.org_id, next)?)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::domain::claim::ClaimStatus;
    use crate::domain::job::TimeWindow;
    use crate::domain::types::Title;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        ORG, RecordingPublisher, manager_user, org, sample_claim, ts, viewer_user,
    };

    fn job(id: i32, crew: &str, start: NaiveDateTime, end: NaiveDateTime, status: JobStatus) -> Job {
        Job {
            id: JobId::new(id).unwrap(),
            org_id: org(),
            claim_id: ClaimId::new(1).unwrap(),
            title: Title::new("Tear-off").unwrap(),
            crew: Some(crew.to_string()),
            window: TimeWindow::new(start, end).unwrap(),
            status,
            notes: None,
            created_at: ts(6),
            updated_at: ts(6),
        }
    }

    fn form(crew: &str, start: u32, end: u32) -> JobForm {
        JobForm {
            claim_id: 1,
            title: "Tear-off".into(),
            crew: Some(crew.into()),
            scheduled_start: ts(start),
            scheduled_end: ts(end),
            notes: None,
        }
    }

    #[test]
    fn overlapping_crew_booking_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_claim_by_id()
            .returning(|id, _| Ok(Some(sample_claim(id.get(), ClaimStatus::Approved))));
        repo.expect_find_crew_conflicts()
            .withf(|org_id, crew, window, exclude| {
                org_id.get() == ORG
                    && crew == "Crew A"
                    && window.start == ts(10)
                    && exclude.is_none()
            })
            .times(1)
            .returning(|_, _, _, _| Ok(vec![job(3, "Crew A", ts(8), ts(12), JobStatus::Scheduled)]));
        repo.expect_create_job().times(0);
        let events = RecordingPublisher::default();

        let result = create_job(&repo, &events, &viewer_user(), form("Crew A", 10, 14));
        assert!(matches!(result, Err(ServiceError::Conflict(message)) if message.contains("job 3")));
        assert!(events.names().is_empty());
    }

    #[test]
    fn free_crew_is_scheduled_and_event_emitted() {
        let mut repo = MockRepository::new();
        repo.expect_get_claim_by_id()
            .returning(|id, _| Ok(Some(sample_claim(id.get(), ClaimStatus::Approved))));
        repo.expect_find_crew_conflicts()
            .returning(|_, _, _, _| Ok(vec![]));
        repo.expect_create_job()
            .withf(|new| new.org_id.get() == ORG && new.crew.as_deref() == Some("Crew A"))
            .times(1)
            .returning(|new| {
                Ok(job(
                    9,
                    "Crew A",
                    new.window.start,
                    new.window.end,
                    JobStatus::Scheduled,
                ))
            });
        let events = RecordingPublisher::default();

        let created = create_job(&repo, &events, &viewer_user(), form("Crew A", 12, 16)).unwrap();
        assert_eq!(created.id.get(), 9);
        assert_eq!(events.names(), vec![WebhookEvent::JobScheduled]);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_create_job().times(0);
        let events = RecordingPublisher::default();

        let result = create_job(&repo, &events, &viewer_user(), form("Crew A", 14, 10));
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn list_rejects_inverted_range() {
        let mut repo = MockRepository::new();
        repo.expect_list_jobs().times(0);

        let result = list_jobs(
            &repo,
            &viewer_user(),
            JobRangeParams {
                from: Some(ts(12)),
                to: Some(ts(8)),
                claim_id: None,
            },
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn completed_job_cannot_restart() {
        let mut repo = MockRepository::new();
        repo.expect_get_job_by_id()
            .returning(|id, _| Ok(Some(job(id.get(), "Crew A", ts(8), ts(12), JobStatus::Completed))));
        repo.expect_get_claim_by_id()
            .returning(|id, _| Ok(Some(sample_claim(id.get(), ClaimStatus::Approved))));
        repo.expect_update_job_status().times(0);

        let result = change_job_status(
            &repo,
            &viewer_user(),
            2,
            JobStatusForm {
                status: "InProgress".into(),
            },
        );
        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    fn job_on_claim(id: i32, claim_id: i32) -> Job {
        let mut job = job(id, "Crew A", ts(8), ts(12), JobStatus::Scheduled);
        job.claim_id = ClaimId::new(claim_id).unwrap();
        job
    }

    fn unassigned_manager_repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.expect_get_job_by_id()
            .returning(|id, _| Ok(Some(job_on_claim(id.get(), 77))));
        repo.expect_get_claim_by_id()
            .returning(|id, _| Ok(Some(sample_claim(id.get(), ClaimStatus::Approved))));
        repo.expect_check_claim_assigned_to_member()
            .withf(|claim_id, _, email| claim_id.get() == 77 && email.as_str() == manager_user().email)
            .returning(|_, _, _| Ok(false));
        repo
    }

    #[test]
    fn manager_cannot_read_job_on_unassigned_claim() {
        let repo = unassigned_manager_repo();

        let result = get_job(&repo, &manager_user(), 5);
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn manager_cannot_move_job_on_unassigned_claim() {
        let mut repo = unassigned_manager_repo();
        repo.expect_update_job_status().times(0);

        let result = change_job_status(
            &repo,
            &manager_user(),
            5,
            JobStatusForm {
                status: "InProgress".into(),
            },
        );
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn manager_reads_job_on_assigned_claim() {
        let mut repo = MockRepository::new();
        repo.expect_get_job_by_id()
            .returning(|id, _| Ok(Some(job_on_claim(id.get(), 77))));
        repo.expect_get_claim_by_id()
            .returning(|id, _| Ok(Some(sample_claim(id.get(), ClaimStatus::Approved))));
        repo.expect_check_claim_assigned_to_member()
            .returning(|_, _, _| Ok(true));

        let found = get_job(&repo, &manager_user(), 5).unwrap();
        assert_eq!(found.claim_id.get(), 77);
    }

    #[test]
    fn manager_list_is_restricted_to_assigned_claims() {
        let mut repo = MockRepository::new();
        repo.expect_list_jobs()
            .withf(|query| {
                query.org_id.get() == ORG
                    && query.assigned_to.as_ref().map(|email| email.as_str())
                        == Some(manager_user().email.as_str())
            })
            .times(1)
            .returning(|_| Ok(vec![]));

        let jobs = list_jobs(
            &repo,
            &manager_user(),
            JobRangeParams {
                from: None,
                to: None,
                claim_id: None,
            },
        )
        .unwrap();
        assert!(jobs.is_empty());
    }

    #[test]
    fn viewer_list_is_not_restricted() {
        let mut repo = MockRepository::new();
        repo.expect_list_jobs()
            .withf(|query| query.assigned_to.is_none())
            .times(1)
            .returning(|_| Ok(vec![]));

        list_jobs(
            &repo,
            &viewer_user(),
            JobRangeParams {
                from: None,
                to: None,
                claim_id: None,
            },
        )
        .unwrap();
    }
}
