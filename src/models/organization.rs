//! Diesel models for organizations and their branding.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::organization::{
    Branding as DomainBranding, NewOrganization as DomainNewOrganization,
    Organization as DomainOrganization, SubscriptionUpdate as DomainSubscriptionUpdate,
    UpdateBranding as DomainUpdateBranding,
};
use crate::domain::types::{
    ContactEmail, HexColor, OrgId, OrgName, PhoneNumber, TypeConstraintError, WebUrl,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::organizations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Organization {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub stripe_customer_id: Option<String>,
    pub subscription_status: String,
    pub plan: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::organizations)]
pub struct NewOrganization<'a> {
    pub id: i32,
    pub name: &'a str,
    pub slug: &'a str,
    pub subscription_status: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::organizations)]
#[diesel(treat_none_as_null = false)]
pub struct SubscriptionChangeset<'a> {
    pub stripe_customer_id: Option<&'a str>,
    pub subscription_status: &'a str,
    pub plan: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::branding)]
#[diesel(primary_key(org_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Branding {
    pub org_id: i32,
    pub company_name: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub accent_color: String,
    pub license_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub updated_at: NaiveDateTime,
}

/// Insertable and changeset form of [`Branding`]; used for upserts.
#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::branding)]
#[diesel(primary_key(org_id))]
#[diesel(treat_none_as_null = true)]
pub struct UpsertBranding<'a> {
    pub org_id: i32,
    pub company_name: &'a str,
    pub logo_url: Option<&'a str>,
    pub primary_color: &'a str,
    pub accent_color: &'a str,
    pub license_number: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub website: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Organization> for DomainOrganization {
    type Error = TypeConstraintError;

    fn try_from(org: Organization) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrgId::new(org.id)?,
            name: OrgName::new(org.name)?,
            slug: org.slug,
            stripe_customer_id: org.stripe_customer_id,
            subscription_status: org.subscription_status.parse()?,
            plan: org.plan,
            created_at: org.created_at,
            updated_at: org.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewOrganization> for NewOrganization<'a> {
    fn from(org: &'a DomainNewOrganization) -> Self {
        Self {
            id: org.id.get(),
            name: org.name.as_str(),
            slug: &org.slug,
            subscription_status: "Trialing",
        }
    }
}

impl<'a> From<&'a DomainSubscriptionUpdate> for SubscriptionChangeset<'a> {
    fn from(update: &'a DomainSubscriptionUpdate) -> Self {
        Self {
            stripe_customer_id: update.stripe_customer_id.as_deref(),
            subscription_status: update.subscription_status.as_str(),
            plan: update.plan.as_deref(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

impl TryFrom<Branding> for DomainBranding {
    type Error = TypeConstraintError;

    fn try_from(branding: Branding) -> Result<Self, Self::Error> {
        Ok(Self {
            org_id: OrgId::new(branding.org_id)?,
            company_name: OrgName::new(branding.company_name)?,
            logo_url: branding.logo_url.map(WebUrl::new).transpose()?,
            primary_color: HexColor::new(branding.primary_color)?,
            accent_color: HexColor::new(branding.accent_color)?,
            license_number: branding.license_number,
            phone: branding.phone.map(PhoneNumber::new).transpose()?,
            email: branding.email.map(ContactEmail::new).transpose()?,
            website: branding.website.map(WebUrl::new).transpose()?,
            updated_at: branding.updated_at,
        })
    }
}

impl<'a> UpsertBranding<'a> {
    pub fn new(org_id: OrgId, branding: &'a DomainUpdateBranding) -> Self {
        Self {
            org_id: org_id.get(),
            company_name: branding.company_name.as_str(),
            logo_url: branding.logo_url.as_ref().map(WebUrl::as_str),
            primary_color: branding.primary_color.as_str(),
            accent_color: branding.accent_color.as_str(),
            license_number: branding.license_number.as_deref(),
            phone: branding.phone.as_ref().map(PhoneNumber::as_str),
            email: branding.email.as_ref().map(ContactEmail::as_str),
            website: branding.website.as_ref().map(WebUrl::as_str),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::organization::SubscriptionStatus;

    #[test]
    fn organization_row_converts_to_domain() {
        let now = chrono::Utc::now().naive_utc();
        let row = Organization {
            id: 4,
            name: "Hailstone Exteriors".to_string(),
            slug: "hailstone-exteriors-4".to_string(),
            stripe_customer_id: Some("cus_123".to_string()),
            subscription_status: "PastDue".to_string(),
            plan: None,
            created_at: now,
            updated_at: now,
        };

        let org = DomainOrganization::try_from(row).expect("valid row");
        assert_eq!(org.subscription_status, SubscriptionStatus::PastDue);
        assert_eq!(org.name.as_str(), "Hailstone Exteriors");
    }

    #[test]
    fn unknown_subscription_status_is_rejected() {
        let now = chrono::Utc::now().naive_utc();
        let row = Organization {
            id: 4,
            name: "Hailstone Exteriors".to_string(),
            slug: "hailstone-exteriors-4".to_string(),
            stripe_customer_id: None,
            subscription_status: "trialing".to_string(),
            plan: None,
            created_at: now,
            updated_at: now,
        };

        assert!(DomainOrganization::try_from(row).is_err());
    }
}
