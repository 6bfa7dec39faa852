use serde::Deserialize;
use validator::Validate;

use crate::domain::depreciation::{AgeYears, DepreciationStatus, NewDepreciationItem};
use crate::domain::types::{Cents, ClaimId, LineDescription, NoteText, OrgId, Rate};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
pub struct DepreciationItemForm {
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    /// Replacement cost value in cents.
    pub original_value: i64,
    pub annual_rate: f64,
    pub age_years: f64,
}

pub struct DepreciationItemPayload {
    pub description: LineDescription,
    pub original_value: Cents,
    pub annual_rate: Rate,
    pub age: AgeYears,
}

impl TryFrom<DepreciationItemForm> for DepreciationItemPayload {
    type Error = FormError;

    fn try_from(form: DepreciationItemForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            description: LineDescription::new(form.description)?,
            original_value: Cents::new(form.original_value)?,
            annual_rate: Rate::new(form.annual_rate)?,
            age: AgeYears::new(form.age_years)?,
        })
    }
}

impl DepreciationItemPayload {
    pub fn into_domain(self, org_id: OrgId, claim_id: ClaimId) -> NewDepreciationItem {
        NewDepreciationItem {
            org_id,
            claim_id,
            description: self.description,
            original_value: self.original_value,
            annual_rate: self.annual_rate,
            age: self.age,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DepreciationTransitionForm {
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
}

pub struct DepreciationTransitionPayload {
    pub status: DepreciationStatus,
    pub note: Option<NoteText>,
}

impl TryFrom<DepreciationTransitionForm> for DepreciationTransitionPayload {
    type Error = FormError;

    fn try_from(form: DepreciationTransitionForm) -> Result<Self, Self::Error> {
        let status = form
            .status
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidStatus(form.status.clone()))?;
        Ok(Self {
            status,
            note: non_blank(form.note).map(NoteText::new).transpose()?,
        })
    }
}
