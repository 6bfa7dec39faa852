use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, NonEmptyString, OrgId, PropertyId, StateCode};

/// Physical site where the roof or structure was damaged.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: PropertyId,
    pub org_id: OrgId,
    pub client_id: ClientId,
    pub address_line: NonEmptyString,
    pub city: NonEmptyString,
    pub state: StateCode,
    pub postal_code: NonEmptyString,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub roof_type: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Property {
    /// Single-line postal address.
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.address_line.as_str(),
            self.city.as_str(),
            self.state,
            self.postal_code.as_str()
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewProperty {
    pub org_id: OrgId,
    pub client_id: ClientId,
    pub address_line: NonEmptyString,
    pub city: NonEmptyString,
    pub state: StateCode,
    pub postal_code: NonEmptyString,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub roof_type: Option<String>,
}
