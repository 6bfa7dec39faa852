//! Crew scheduling for claim work.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClaimId, JobId, OrgId, Title, TypeConstraintError};

status_enum!(
    JobStatus {
        Scheduled,
        InProgress,
        Completed,
        Cancelled,
    }
);

impl JobStatus {
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Scheduled, InProgress)
                | (Scheduled, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }

    /// Whether a job in this state still occupies its crew.
    pub fn holds_crew(self) -> bool {
        matches!(self, JobStatus::Scheduled | JobStatus::InProgress)
    }
}

/// Half-open time window `[start, end)`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, TypeConstraintError> {
        if end <= start {
            return Err(TypeConstraintError::InvalidValue(
                "job must end after it starts".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub org_id: OrgId,
    pub claim_id: ClaimId,
    pub title: Title,
    pub crew: Option<String>,
    pub window: TimeWindow,
    pub status: JobStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewJob {
    pub org_id: OrgId,
    pub claim_id: ClaimId,
    pub title: Title,
    pub crew: Option<String>,
    pub window: TimeWindow,
    pub notes: Option<String>,
}
