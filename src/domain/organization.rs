//! Tenant organizations, their subscription state and branding.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ContactEmail, HexColor, OrgId, OrgName, PhoneNumber, WebUrl};

status_enum!(
    /// Billing state mirrored from the payment provider.
    SubscriptionStatus {
        Trialing,
        Active,
        PastDue,
        Canceled,
        Unpaid,
        Incomplete,
    }
);

impl SubscriptionStatus {
    /// Maps the payment provider's snake_case status string.
    pub fn from_provider(status: &str) -> Option<Self> {
        match status {
            "trialing" => Some(Self::Trialing),
            "active" => Some(Self::Active),
            "past_due" => Some(Self::PastDue),
            "canceled" => Some(Self::Canceled),
            "unpaid" => Some(Self::Unpaid),
            "incomplete" | "incomplete_expired" => Some(Self::Incomplete),
            _ => None,
        }
    }

    /// Whether the organization may use paid features.
    pub fn is_entitled(self) -> bool {
        matches!(self, Self::Trialing | Self::Active)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub id: OrgId,
    pub name: OrgName,
    pub slug: String,
    pub stripe_customer_id: Option<String>,
    pub subscription_status: SubscriptionStatus,
    pub plan: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Organization provisioned on the first session of one of its members.
///
/// The identifier is issued by the identity provider, so it is supplied rather
/// than generated.
#[derive(Clone, Debug, PartialEq)]
pub struct NewOrganization {
    pub id: OrgId,
    pub name: OrgName,
    pub slug: String,
}

impl NewOrganization {
    #[must_use]
    pub fn new(id: OrgId, name: OrgName) -> Self {
        let mut slug: String = name
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        slug = slug
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        if slug.is_empty() {
            slug = "org".to_string();
        }
        Self {
            id,
            name,
            slug: format!("{slug}-{id}"),
        }
    }
}

/// Change set applied when billing state is synchronized.
#[derive(Clone, Debug, PartialEq)]
pub struct SubscriptionUpdate {
    pub stripe_customer_id: Option<String>,
    pub subscription_status: SubscriptionStatus,
    pub plan: Option<String>,
}

/// Company branding printed on generated documents and emails.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Branding {
    pub org_id: OrgId,
    pub company_name: OrgName,
    pub logo_url: Option<WebUrl>,
    pub primary_color: HexColor,
    pub accent_color: HexColor,
    pub license_number: Option<String>,
    pub phone: Option<PhoneNumber>,
    pub email: Option<ContactEmail>,
    pub website: Option<WebUrl>,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateBranding {
    pub company_name: OrgName,
    pub logo_url: Option<WebUrl>,
    pub primary_color: HexColor,
    pub accent_color: HexColor,
    pub license_number: Option<String>,
    pub phone: Option<PhoneNumber>,
    pub email: Option<ContactEmail>,
    pub website: Option<WebUrl>,
}

impl Branding {
    /// Branding used when an organization has not configured its own yet.
    pub fn fallback(org: &Organization) -> Self {
        Self {
            org_id: org.id,
            company_name: org.name.clone(),
            logo_url: None,
            primary_color: HexColor::default_primary(),
            accent_color: HexColor::default_accent(),
            license_number: None,
            phone: None,
            email: None,
            website: None,
            updated_at: org.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_statuses_map() {
        assert_eq!(
            SubscriptionStatus::from_provider("past_due"),
            Some(SubscriptionStatus::PastDue)
        );
        assert_eq!(
            SubscriptionStatus::from_provider("incomplete_expired"),
            Some(SubscriptionStatus::Incomplete)
        );
        assert_eq!(SubscriptionStatus::from_provider("paused"), None);
    }

    #[test]
    fn slugs_are_derived_from_name_and_id() {
        let org = NewOrganization::new(
            OrgId::new(12).expect("org"),
            OrgName::new("Apex Roofing & Restoration, LLC").expect("name"),
        );
        assert_eq!(org.slug, "apex-roofing-restoration-llc-12");
    }

    #[test]
    fn only_trialing_and_active_are_entitled() {
        let entitled: Vec<_> = SubscriptionStatus::ALL
            .iter()
            .filter(|s| s.is_entitled())
            .collect();
        assert_eq!(
            entitled,
            vec![&SubscriptionStatus::Trialing, &SubscriptionStatus::Active]
        );
    }
}
