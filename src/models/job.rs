use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::job::{Job as DomainJob, NewJob as DomainNewJob, TimeWindow};
use crate::domain::types::{ClaimId, JobId, OrgId, Title, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Job {
    pub id: i32,
    pub org_id: i32,
    pub claim_id: i32,
    pub title: String,
    pub crew: Option<String>,
    pub scheduled_start: NaiveDateTime,
    pub scheduled_end: NaiveDateTime,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::jobs)]
pub struct NewJob<'a> {
    pub org_id: i32,
    pub claim_id: i32,
    pub title: &'a str,
    pub crew: Option<&'a str>,
    pub scheduled_start: NaiveDateTime,
    pub scheduled_end: NaiveDateTime,
    pub status: &'a str,
    pub notes: Option<&'a str>,
}

impl TryFrom<Job> for DomainJob {
    type Error = TypeConstraintError;

    fn try_from(job: Job) -> Result<Self, Self::Error> {
        Ok(Self {
            id: JobId::new(job.id)?,
            org_id: OrgId::new(job.org_id)?,
            claim_id: ClaimId::new(job.claim_id)?,
            title: Title::new(job.title)?,
            crew: job.crew,
            window: TimeWindow::new(job.scheduled_start, job.scheduled_end)?,
            status: job.status.parse()?,
            notes: job.notes,
            created_at: job.created_at,
            updated_at: job.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewJob> for NewJob<'a> {
    fn from(job: &'a DomainNewJob) -> Self {
        Self {
            org_id: job.org_id.get(),
            claim_id: job.claim_id.get(),
            title: job.title.as_str(),
            crew: job.crew.as_deref(),
            scheduled_start: job.window.start,
            scheduled_end: job.window.end,
            status: "Scheduled",
            notes: job.notes.as_deref(),
        }
    }
}
