//! Business operations behind the HTTP routes.
//!
//! Every operation takes the repository as a generic trait bound so it can be
//! exercised against the mock repository, checks the caller's role first and
//! derives the tenant from the authenticated user only.

use serde_json::Value;
use thiserror::Error;

use crate::domain::types::OrgId;
use crate::domain::webhook::{Webhook, WebhookEvent};
use crate::forms::FormError;
use crate::repository::errors::RepositoryError;

pub mod billing;
pub mod claims;
pub mod clients;
pub mod compliance;
pub mod depreciation;
pub mod documents;
pub mod estimates;
pub mod jobs;
pub mod leads;
pub mod members;
pub mod notifications;
pub mod organizations;
pub mod webhooks;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Form(String),
    #[error("invalid value: {0}")]
    TypeConstraint(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("upstream service failed: {0}")]
    External(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Conflict(message) => ServiceError::Conflict(message),
            RepositoryError::ConstraintViolation(message) => ServiceError::Conflict(message),
            RepositoryError::ValidationError(message) => ServiceError::Form(message),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}

/// Sink for outbound webhook events raised by the services.
///
/// Publishing never fails the calling operation; implementations log and
/// record delivery problems on their own.
pub trait EventPublisher {
    /// Fans `event` out to every active webhook of the organization subscribed to it.
    fn publish(&self, org_id: OrgId, event: WebhookEvent, data: Value);

    /// Sends `event` to a single webhook regardless of its subscriptions.
    fn publish_to(&self, webhook: &Webhook, event: WebhookEvent, data: Value);
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;

    use chrono::{NaiveDate, NaiveDateTime};
    use serde_json::Value;

    use super::EventPublisher;
    use crate::domain::claim::{Claim, ClaimStatus, DamageType};
    use crate::domain::client::Client;
    use crate::domain::member::Member;
    use crate::domain::organization::{Organization, SubscriptionStatus};
    use crate::domain::property::Property;
    use crate::domain::types::{
        CarrierName, ClaimId, ClaimNumber, ClientId, ClientName, ContactEmail, MemberEmail,
        MemberId, MemberName, NonEmptyString, OrgName, PropertyId, StateCode, WebUrl, WebhookId,
    };
    use crate::SERVICE_ACCESS_ROLE;
    use crate::SERVICE_ADMIN_ROLE;
    use crate::SERVICE_MANAGER_ROLE;
    use crate::auth::AuthenticatedUser;
    use crate::domain::types::OrgId;
    use crate::domain::webhook::{Webhook, WebhookEvent};

    pub const ORG: i32 = 42;

    /// Builds an admin user for test scenarios.
    pub fn admin_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".to_string(),
            email: "admin@example.com".to_string(),
            org_id: ORG,
            name: "Admin".to_string(),
            roles: vec![
                SERVICE_ACCESS_ROLE.to_string(),
                SERVICE_ADMIN_ROLE.to_string(),
            ],
            exp: 0,
            org_name: None,
        }
    }

    /// Builds a user with plain access rights.
    pub fn viewer_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "2".to_string(),
            email: "viewer@example.com".to_string(),
            org_id: ORG,
            name: "Viewer".to_string(),
            roles: vec![SERVICE_ACCESS_ROLE.to_string()],
            exp: 0,
            org_name: None,
        }
    }

    /// Builds a manager restricted to assigned claims.
    pub fn manager_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "3".to_string(),
            email: "manager@example.com".to_string(),
            org_id: ORG,
            name: "Manager".to_string(),
            roles: vec![
                SERVICE_ACCESS_ROLE.to_string(),
                SERVICE_MANAGER_ROLE.to_string(),
            ],
            exp: 0,
            org_name: None,
        }
    }

    /// Publisher remembering every event instead of delivering it.
    #[derive(Default)]
    pub struct RecordingPublisher {
        pub events: RefCell<Vec<(i32, WebhookEvent, Value)>>,
    }

    impl RecordingPublisher {
        pub fn names(&self) -> Vec<WebhookEvent> {
            self.events.borrow().iter().map(|(_, e, _)| *e).collect()
        }
    }

    pub fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    pub fn org() -> OrgId {
        OrgId::new(ORG).unwrap()
    }

    pub fn sample_organization() -> Organization {
        Organization {
            id: org(),
            name: OrgName::new("Summit Roofing").unwrap(),
            slug: "summit-roofing-42".to_string(),
            stripe_customer_id: None,
            subscription_status: SubscriptionStatus::Trialing,
            plan: None,
            created_at: ts(8),
            updated_at: ts(8),
        }
    }

    pub fn sample_member(id: i32, email: &str) -> Member {
        Member {
            id: MemberId::new(id).unwrap(),
            org_id: org(),
            name: MemberName::new(format!("Member {id}")).unwrap(),
            email: MemberEmail::new(email).unwrap(),
            is_user: true,
        }
    }

    pub fn sample_client(id: i32) -> Client {
        Client {
            id: ClientId::new(id).unwrap(),
            org_id: org(),
            name: ClientName::new("Pat Homeowner").unwrap(),
            email: Some(ContactEmail::new("pat@example.com").unwrap()),
            phone: None,
            address: Some("12 Elm St".to_string()),
            created_at: ts(8),
            updated_at: ts(8),
        }
    }

    pub fn sample_property(id: i32, client_id: i32, state: &str) -> Property {
        Property {
            id: PropertyId::new(id).unwrap(),
            org_id: org(),
            client_id: ClientId::new(client_id).unwrap(),
            address_line: NonEmptyString::new("12 Elm St").unwrap(),
            city: NonEmptyString::new("Plano").unwrap(),
            state: StateCode::new(state).unwrap(),
            postal_code: NonEmptyString::new("75023").unwrap(),
            latitude: None,
            longitude: None,
            roof_type: Some("Asphalt shingle".to_string()),
            created_at: ts(8),
        }
    }

    pub fn sample_claim(id: i32, status: ClaimStatus) -> Claim {
        Claim {
            id: ClaimId::new(id).unwrap(),
            org_id: org(),
            client_id: ClientId::new(1).unwrap(),
            property_id: Some(PropertyId::new(1).unwrap()),
            claim_number: ClaimNumber::new(format!("CLM-{id}")).unwrap(),
            carrier: CarrierName::new("State Farm").unwrap(),
            policy_number: Some("POL-77".to_string()),
            status,
            damage_type: DamageType::Hail,
            date_of_loss: NaiveDate::from_ymd_opt(2025, 5, 20),
            description: Some("Hail damage on north slope".to_string()),
            approved_amount: None,
            created_at: ts(8),
            updated_at: ts(8),
        }
    }

    pub fn sample_webhook(id: i32) -> Webhook {
        Webhook {
            id: WebhookId::new(id).unwrap(),
            org_id: org(),
            url: WebUrl::new("https://hooks.example.com/stormdesk").unwrap(),
            secret: "whsec_test".to_string(),
            events: vec![WebhookEvent::ClaimCreated],
            is_active: true,
            failure_count: 0,
            last_success_at: None,
            last_failure_at: None,
            created_at: ts(8),
        }
    }

    impl EventPublisher for RecordingPublisher {
        fn publish(&self, org_id: OrgId, event: WebhookEvent, data: Value) {
            self.events.borrow_mut().push((org_id.get(), event, data));
        }

        fn publish_to(&self, webhook: &Webhook, event: WebhookEvent, data: Value) {
            self.events
                .borrow_mut()
                .push((webhook.org_id.get(), event, data));
        }
    }
}
