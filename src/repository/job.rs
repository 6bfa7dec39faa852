use diesel::prelude::*;

use crate::domain::job::{Job, JobStatus, NewJob, TimeWindow};
use crate::domain::types::{JobId, OrgId};
use crate::models::job::{Job as DbJob, NewJob as DbNewJob};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, JobListQuery, JobReader, JobWriter};
use crate::schema::{claim_assignments, claims, jobs, members};

const CREW_HOLDING: [JobStatus; 2] = [JobStatus::Scheduled, JobStatus::InProgress];

impl JobReader for DieselRepository {
    fn get_job_by_id(&self, id: JobId, org_id: OrgId) -> RepositoryResult<Option<Job>> {
        let mut conn = self.conn()?;

        let job = jobs::table
            .filter(jobs::id.eq(id.get()))
            .filter(jobs::org_id.eq(org_id.get()))
            .select(DbJob::as_select())
            .first::<DbJob>(&mut conn)
            .optional()?;

        Ok(job.map(Job::try_from).transpose()?)
    }

    fn list_jobs(&self, query: JobListQuery) -> RepositoryResult<Vec<Job>> {
        let mut conn = self.conn()?;

        let mut items = jobs::table
            .filter(jobs::org_id.eq(query.org_id.get()))
            .into_boxed();

        if let Some(from) = query.from {
            items = items.filter(jobs::scheduled_start.ge(from));
        }
        if let Some(to) = query.to {
            items = items.filter(jobs::scheduled_start.lt(to));
        }
        if let Some(claim_id) = query.claim_id {
            items = items.filter(jobs::claim_id.eq(claim_id.get()));
        }
        if let Some(email) = &query.assigned_to {
            let member_ids = members::table
                .filter(members::email.eq(email.as_str().to_string()))
                .filter(members::org_id.eq(query.org_id.get()))
                .select(members::id);
            let claim_ids = claim_assignments::table
                .filter(claim_assignments::member_id.eq_any(member_ids))
                .select(claim_assignments::claim_id);
            items = items.filter(jobs::claim_id.eq_any(claim_ids));
        }

        let rows = items
            .order(jobs::scheduled_start.asc())
            .select(DbJob::as_select())
            .load::<DbJob>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(Job::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn find_crew_conflicts(
        &self,
        org_id: OrgId,
        crew: &str,
        window: &TimeWindow,
        exclude: Option<JobId>,
    ) -> RepositoryResult<Vec<Job>> {
        let mut conn = self.conn()?;

        let holding: Vec<&str> = CREW_HOLDING.iter().map(|s| s.as_str()).collect();

        let mut items = jobs::table
            .filter(jobs::org_id.eq(org_id.get()))
            .filter(jobs::crew.eq(crew))
            .filter(jobs::status.eq_any(holding))
            .filter(jobs::scheduled_start.lt(window.end))
            .filter(jobs::scheduled_end.gt(window.start))
            .into_boxed();

        if let Some(exclude) = exclude {
            items = items.filter(jobs::id.ne(exclude.get()));
        }

        let rows = items
            .order(jobs::scheduled_start.asc())
            .select(DbJob::as_select())
            .load::<DbJob>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(Job::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl JobWriter for DieselRepository {
    fn create_job(&self, job: &NewJob) -> RepositoryResult<Job> {
        let mut conn = self.conn()?;

        conn.transaction::<Job, RepositoryError, _>(|conn| {
            let claim_owned: bool = diesel::select(diesel::dsl::exists(
                claims::table
                    .filter(claims::id.eq(job.claim_id.get()))
                    .filter(claims::org_id.eq(job.org_id.get())),
            ))
            .get_result(conn)?;
            if !claim_owned {
                return Err(RepositoryError::NotFound);
            }

            let stored = diesel::insert_into(jobs::table)
                .values(DbNewJob::from(job))
                .returning(DbJob::as_returning())
                .get_result::<DbJob>(conn)?;

            Ok(stored.try_into()?)
        })
    }

    fn update_job_status(
        &self,
        id: JobId,
        org_id: OrgId,
        status: JobStatus,
    ) -> RepositoryResult<Job> {
        let mut conn = self.conn()?;

        let updated = diesel::update(
            jobs::table
                .filter(jobs::id.eq(id.get()))
                .filter(jobs::org_id.eq(org_id.get())),
        )
        .set((
            jobs::status.eq(status.as_str()),
            jobs::updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .returning(DbJob::as_returning())
        .get_result::<DbJob>(&mut conn)?;

        Ok(updated.try_into()?)
    }
}
