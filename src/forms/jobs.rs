use chrono::NaiveDateTime;
use serde::Deserialize;
use validator::Validate;

use crate::domain::job::{JobStatus, NewJob, TimeWindow};
use crate::domain::types::{ClaimId, OrgId, Title};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
pub struct JobForm {
    pub claim_id: i32,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub crew: Option<String>,
    pub scheduled_start: NaiveDateTime,
    pub scheduled_end: NaiveDateTime,
    #[serde(default)]
    pub notes: Option<String>,
}

pub struct JobPayload {
    pub claim_id: ClaimId,
    pub title: Title,
    pub crew: Option<String>,
    pub window: TimeWindow,
    pub notes: Option<String>,
}

impl TryFrom<JobForm> for JobPayload {
    type Error = FormError;

    fn try_from(form: JobForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            claim_id: ClaimId::new(form.claim_id).map_err(|_| FormError::InvalidId)?,
            title: Title::new(form.title)?,
            crew: non_blank(form.crew),
            window: TimeWindow::new(form.scheduled_start, form.scheduled_end)?,
            notes: non_blank(form.notes).map(|n| ammonia::clean(&n)),
        })
    }
}

impl JobPayload {
    pub fn into_domain(self, org_id: OrgId) -> NewJob {
        NewJob {
            org_id,
            claim_id: self.claim_id,
            title: self.title,
            crew: self.crew,
            window: self.window,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JobStatusForm {
    pub status: String,
}

impl TryFrom<JobStatusForm> for JobStatus {
    type Error = FormError;

    fn try_from(form: JobStatusForm) -> Result<Self, Self::Error> {
        form.status
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidStatus(form.status.clone()))
    }
}

/// Calendar range `[from, to)` of the job list.
#[derive(Debug, Default, Deserialize)]
pub struct JobRangeParams {
    #[serde(default)]
    pub from: Option<NaiveDateTime>,
    #[serde(default)]
    pub to: Option<NaiveDateTime>,
    #[serde(default)]
    pub claim_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn form(start: u32, end: u32) -> JobForm {
        JobForm {
            claim_id: 5,
            title: "Tear-off".to_string(),
            crew: Some(" Crew A ".to_string()),
            scheduled_start: at(start),
            scheduled_end: at(end),
            notes: None,
        }
    }

    #[test]
    fn job_form_builds_window() {
        let payload = JobPayload::try_from(form(8, 16)).unwrap();
        assert_eq!(payload.window.start, at(8));
        assert_eq!(payload.crew.as_deref(), Some("Crew A"));
    }

    #[test]
    fn job_must_end_after_start() {
        assert!(matches!(
            JobPayload::try_from(form(16, 16)),
            Err(FormError::InvalidValue(_))
        ));
        assert!(JobPayload::try_from(form(16, 8)).is_err());
    }
}
