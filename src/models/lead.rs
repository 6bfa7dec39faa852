use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::lead::{Lead as DomainLead, NewLead as DomainNewLead};
use crate::domain::types::{
    ClientId, ClientName, ContactEmail, LeadId, OrgId, PhoneNumber, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::leads)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Lead {
    pub id: i32,
    pub org_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub source: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub client_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::leads)]
pub struct NewLead<'a> {
    pub org_id: i32,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub source: Option<&'a str>,
    pub status: &'a str,
    pub notes: Option<&'a str>,
}

impl TryFrom<Lead> for DomainLead {
    type Error = TypeConstraintError;

    fn try_from(lead: Lead) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LeadId::new(lead.id)?,
            org_id: OrgId::new(lead.org_id)?,
            name: ClientName::new(lead.name)?,
            email: lead.email.map(ContactEmail::new).transpose()?,
            phone: lead.phone.map(PhoneNumber::new).transpose()?,
            address: lead.address,
            source: lead.source,
            status: lead.status.parse()?,
            notes: lead.notes,
            client_id: lead.client_id.map(ClientId::new).transpose()?,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewLead> for NewLead<'a> {
    fn from(lead: &'a DomainNewLead) -> Self {
        Self {
            org_id: lead.org_id.get(),
            name: lead.name.as_str(),
            email: lead.email.as_ref().map(ContactEmail::as_str),
            phone: lead.phone.as_ref().map(PhoneNumber::as_str),
            address: lead.address.as_deref(),
            source: lead.source.as_deref(),
            status: "New",
            notes: lead.notes.as_deref(),
        }
    }
}
