use serde::Deserialize;
use validator::Validate;

use crate::domain::lead::{LeadStatus, NewLead};
use crate::domain::types::{ClientName, ContactEmail, OrgId, PhoneNumber};
use crate::forms::{FormError, non_blank, parse_optional};

#[derive(Debug, Deserialize, Validate)]
pub struct LeadForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub struct LeadPayload {
    pub name: ClientName,
    pub email: Option<ContactEmail>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<LeadForm> for LeadPayload {
    type Error = FormError;

    fn try_from(form: LeadForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let payload = Self {
            name: ClientName::new(form.name).map_err(|_| FormError::InvalidName)?,
            email: parse_optional(form.email, ContactEmail::new)?,
            phone: parse_optional(form.phone, PhoneNumber::new)?,
            address: non_blank(form.address),
            source: non_blank(form.source),
            notes: non_blank(form.notes).map(|n| ammonia::clean(&n)),
        };
        if payload.email.is_none() && payload.phone.is_none() {
            return Err(FormError::InvalidValue(
                "a lead needs an email or a phone number".to_string(),
            ));
        }
        Ok(payload)
    }
}

impl LeadPayload {
    pub fn into_domain(self, org_id: OrgId) -> NewLead {
        NewLead {
            org_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            source: self.source,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LeadStatusForm {
    pub status: String,
}

impl TryFrom<LeadStatusForm> for LeadStatus {
    type Error = FormError;

    fn try_from(form: LeadStatusForm) -> Result<Self, Self::Error> {
        form.status
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidStatus(form.status.clone()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LeadListParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}
