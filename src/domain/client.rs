use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, ClientName, ContactEmail, OrgId, PhoneNumber};

/// Homeowner or business the contractor works for.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub org_id: OrgId,
    pub name: ClientName,
    pub email: Option<ContactEmail>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewClient {
    pub org_id: OrgId,
    pub name: ClientName,
    pub email: Option<ContactEmail>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<String>,
}

impl NewClient {
    #[must_use]
    pub fn new(
        org_id: OrgId,
        name: ClientName,
        email: Option<ContactEmail>,
        phone: Option<PhoneNumber>,
        address: Option<String>,
    ) -> Self {
        Self {
            org_id,
            name,
            email,
            phone,
            address: address
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateClient {
    pub name: ClientName,
    pub email: Option<ContactEmail>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<String>,
}

impl UpdateClient {
    #[must_use]
    pub fn new(
        name: ClientName,
        email: Option<ContactEmail>,
        phone: Option<PhoneNumber>,
        address: Option<String>,
    ) -> Self {
        Self {
            name,
            email,
            phone,
            address: address
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_address_is_dropped() {
        let client = NewClient::new(
            OrgId::new(1).expect("org"),
            ClientName::new("Pat Rivers").expect("name"),
            None,
            None,
            Some("   ".to_string()),
        );
        assert_eq!(client.address, None);
    }
}
