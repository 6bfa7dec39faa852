use serde::Deserialize;
use validator::Validate;

use crate::domain::property::NewProperty;
use crate::domain::types::{ClientId, NonEmptyString, OrgId, StateCode};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
pub struct PropertyForm {
    #[validate(length(min = 1))]
    pub address_line: String,
    #[validate(length(min = 1))]
    pub city: String,
    pub state: String,
    #[validate(length(min = 3, max = 10))]
    pub postal_code: String,
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub roof_type: Option<String>,
}

pub struct PropertyPayload {
    pub address_line: NonEmptyString,
    pub city: NonEmptyString,
    pub state: StateCode,
    pub postal_code: NonEmptyString,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub roof_type: Option<String>,
}

impl TryFrom<PropertyForm> for PropertyPayload {
    type Error = FormError;

    fn try_from(form: PropertyForm) -> Result<Self, Self::Error> {
        form.validate()?;
        if form.latitude.is_some() != form.longitude.is_some() {
            return Err(FormError::InvalidValue(
                "latitude and longitude must be given together".to_string(),
            ));
        }
        Ok(Self {
            address_line: NonEmptyString::new(form.address_line)?,
            city: NonEmptyString::new(form.city)?,
            state: StateCode::new(form.state)?,
            postal_code: NonEmptyString::new(form.postal_code)?,
            latitude: form.latitude,
            longitude: form.longitude,
            roof_type: non_blank(form.roof_type),
        })
    }
}

impl PropertyPayload {
    pub fn into_domain(self, org_id: OrgId, client_id: ClientId) -> NewProperty {
        NewProperty {
            org_id,
            client_id,
            address_line: self.address_line,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            latitude: self.latitude,
            longitude: self.longitude,
            roof_type: self.roof_type,
        }
    }
}
