use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, ClientName, ContactEmail, LeadId, OrgId, PhoneNumber};

status_enum!(
    LeadStatus {
        New,
        Contacted,
        Qualified,
        Converted,
        Lost,
    }
);

impl LeadStatus {
    /// Manual status changes. `Converted` is only reachable through conversion.
    pub fn can_transition_to(self, next: LeadStatus) -> bool {
        self != LeadStatus::Converted && next != LeadStatus::Converted && self != next
    }
}

/// Prospect captured from canvassing, referrals or the web form.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    pub id: LeadId,
    pub org_id: OrgId,
    pub name: ClientName,
    pub email: Option<ContactEmail>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<String>,
    pub source: Option<String>,
    pub status: LeadStatus,
    pub notes: Option<String>,
    pub client_id: Option<ClientId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewLead {
    pub org_id: OrgId,
    pub name: ClientName,
    pub email: Option<ContactEmail>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}
