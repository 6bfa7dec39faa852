//! Diesel models for insurance claims.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::claim::{
    Claim as DomainClaim, NewClaim as DomainNewClaim, UpdateClaim as DomainUpdateClaim,
};
use crate::domain::types::{
    CarrierName, Cents, ClaimId, ClaimNumber, ClientId, OrgId, PropertyId, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::claims)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Claim {
    pub id: i32,
    pub org_id: i32,
    pub client_id: i32,
    pub property_id: Option<i32>,
    pub claim_number: String,
    pub carrier: String,
    pub policy_number: Option<String>,
    pub status: String,
    pub damage_type: String,
    pub date_of_loss: Option<NaiveDate>,
    pub description: Option<String>,
    pub approved_amount_cents: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::claims)]
pub struct NewClaim<'a> {
    pub org_id: i32,
    pub client_id: i32,
    pub property_id: Option<i32>,
    pub claim_number: &'a str,
    pub carrier: &'a str,
    pub policy_number: Option<&'a str>,
    pub status: &'a str,
    pub damage_type: &'a str,
    pub date_of_loss: Option<NaiveDate>,
    pub description: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::claims)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateClaim<'a> {
    pub property_id: Option<i32>,
    pub carrier: &'a str,
    pub policy_number: Option<&'a str>,
    pub damage_type: &'a str,
    pub date_of_loss: Option<NaiveDate>,
    pub description: Option<&'a str>,
    pub approved_amount_cents: Option<i64>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Claim> for DomainClaim {
    type Error = TypeConstraintError;

    fn try_from(claim: Claim) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ClaimId::new(claim.id)?,
            org_id: OrgId::new(claim.org_id)?,
            client_id: ClientId::new(claim.client_id)?,
            property_id: claim.property_id.map(PropertyId::new).transpose()?,
            claim_number: ClaimNumber::new(claim.claim_number)?,
            carrier: CarrierName::new(claim.carrier)?,
            policy_number: claim.policy_number,
            status: claim.status.parse()?,
            damage_type: claim.damage_type.parse()?,
            date_of_loss: claim.date_of_loss,
            description: claim.description,
            approved_amount: claim.approved_amount_cents.map(Cents::new).transpose()?,
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewClaim> for NewClaim<'a> {
    fn from(claim: &'a DomainNewClaim) -> Self {
        Self {
            org_id: claim.org_id.get(),
            client_id: claim.client_id.get(),
            property_id: claim.property_id.map(PropertyId::get),
            claim_number: claim.claim_number.as_str(),
            carrier: claim.carrier.as_str(),
            policy_number: claim.policy_number.as_deref(),
            status: "New",
            damage_type: claim.damage_type.as_str(),
            date_of_loss: claim.date_of_loss,
            description: claim.description.as_deref(),
        }
    }
}

impl<'a> From<&'a DomainUpdateClaim> for UpdateClaim<'a> {
    fn from(claim: &'a DomainUpdateClaim) -> Self {
        Self {
            property_id: claim.property_id.map(PropertyId::get),
            carrier: claim.carrier.as_str(),
            policy_number: claim.policy_number.as_deref(),
            damage_type: claim.damage_type.as_str(),
            date_of_loss: claim.date_of_loss,
            description: claim.description.as_deref(),
            approved_amount_cents: claim.approved_amount.map(Cents::get),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::claim::{ClaimStatus, DamageType};

    fn row(status: &str) -> Claim {
        let now = chrono::Utc::now().naive_utc();
        Claim {
            id: 10,
            org_id: 1,
            client_id: 3,
            property_id: None,
            claim_number: "HO-2231-77".to_string(),
            carrier: "State Mutual".to_string(),
            policy_number: None,
            status: status.to_string(),
            damage_type: "Hail".to_string(),
            date_of_loss: NaiveDate::from_ymd_opt(2026, 4, 12),
            description: None,
            approved_amount_cents: Some(1_250_000),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn claim_row_converts_to_domain() {
        let claim = DomainClaim::try_from(row("Filed")).expect("valid row");
        assert_eq!(claim.status, ClaimStatus::Filed);
        assert_eq!(claim.damage_type, DamageType::Hail);
        assert_eq!(claim.approved_amount.map(Cents::get), Some(1_250_000));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(DomainClaim::try_from(row("Archived")).is_err());
    }

    #[test]
    fn new_claims_start_as_new() {
        let domain = DomainNewClaim {
            org_id: OrgId::new(1).expect("org"),
            client_id: ClientId::new(3).expect("client"),
            property_id: None,
            claim_number: ClaimNumber::new("HO-1").expect("number"),
            carrier: CarrierName::new("State Mutual").expect("carrier"),
            policy_number: None,
            damage_type: DamageType::Wind,
            date_of_loss: None,
            description: None,
        };
        let insertable: NewClaim = (&domain).into();
        assert_eq!(insertable.status, "New");
        assert_eq!(insertable.damage_type, "Wind");
    }
}
