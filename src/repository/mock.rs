//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::claim::{Claim, ClaimStatus, NewClaim, UpdateClaim};
use crate::domain::claim_event::{ClaimEvent, NewClaimEvent};
use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::depreciation::{
    DepreciationEvent, DepreciationItem, DepreciationStatus, NewDepreciationItem,
};
use crate::domain::estimate::{Estimate, EstimateStatus, NewEstimate};
use crate::domain::job::{Job, JobStatus, NewJob, TimeWindow};
use crate::domain::lead::{Lead, LeadStatus, NewLead};
use crate::domain::member::{Member, NewMember};
use crate::domain::notification::{NewNotification, Notification};
use crate::domain::organization::{
    Branding, NewOrganization, Organization, SubscriptionUpdate, UpdateBranding,
};
use crate::domain::property::{NewProperty, Property};
use crate::domain::types::{
    ClaimEventId, ClaimId, ClientId, DeliveryId, DepreciationItemId, EstimateId, JobId, LeadId,
    MemberEmail, MemberId, NotificationId, OrgId, PropertyId, WebhookId,
};
use crate::domain::webhook::{
    DeliveryOutcome, NewWebhook, NewWebhookDelivery, Webhook, WebhookDelivery, WebhookEvent,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ClaimEventListQuery, ClaimEventReader, ClaimEventWriter, ClaimListQuery, ClaimReader,
    ClaimWriter, ClientListQuery, ClientReader, ClientWriter, DepreciationReader,
    DepreciationWriter, EstimateReader, EstimateWriter, JobListQuery, JobReader, JobWriter,
    LeadListQuery, LeadReader, LeadWriter, MemberReader, MemberWriter, NotificationListQuery,
    NotificationReader, NotificationWriter, OrganizationReader, OrganizationWriter,
    PropertyReader, PropertyWriter, StripeEventWriter, WebhookReader, WebhookWriter,
};

mock! {
    pub Repository {}

    impl OrganizationReader for Repository {
        fn get_organization(&self, org_id: OrgId) -> RepositoryResult<Option<Organization>>;
        fn get_organization_by_customer(
            &self,
            stripe_customer_id: &str,
        ) -> RepositoryResult<Option<Organization>>;
        fn get_branding(&self, org_id: OrgId) -> RepositoryResult<Option<Branding>>;
    }

    impl OrganizationWriter for Repository {
        fn ensure_organization(&self, org: &NewOrganization) -> RepositoryResult<Organization>;
        fn update_subscription(
            &self,
            org_id: OrgId,
            update: &SubscriptionUpdate,
        ) -> RepositoryResult<Organization>;
        fn upsert_branding(
            &self,
            org_id: OrgId,
            branding: &UpdateBranding,
        ) -> RepositoryResult<Branding>;
    }

    impl MemberReader for Repository {
        fn get_member_by_id(&self, id: MemberId, org_id: OrgId) -> RepositoryResult<Option<Member>>;
        fn get_member_by_email(
            &self,
            email: &MemberEmail,
            org_id: OrgId,
        ) -> RepositoryResult<Option<Member>>;
        fn list_members(&self, org_id: OrgId) -> RepositoryResult<Vec<Member>>;
        fn list_claim_assignees(
            &self,
            claim_id: ClaimId,
            org_id: OrgId,
        ) -> RepositoryResult<Vec<Member>>;
    }

    impl MemberWriter for Repository {
        fn create_or_update_member(&self, member: &NewMember) -> RepositoryResult<Member>;
        fn assign_members_to_claim(
            &self,
            claim_id: ClaimId,
            org_id: OrgId,
            member_ids: &[MemberId],
        ) -> RepositoryResult<usize>;
    }

    impl ClientReader for Repository {
        fn get_client_by_id(&self, id: ClientId, org_id: OrgId) -> RepositoryResult<Option<Client>>;
        fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
    }

    impl ClientWriter for Repository {
        fn create_client(&self, client: &NewClient) -> RepositoryResult<Client>;
        fn create_clients(&self, clients: &[NewClient]) -> RepositoryResult<usize>;
        fn update_client(
            &self,
            id: ClientId,
            org_id: OrgId,
            updates: &UpdateClient,
        ) -> RepositoryResult<Client>;
        fn delete_client(&self, id: ClientId, org_id: OrgId) -> RepositoryResult<()>;
    }

    impl PropertyReader for Repository {
        fn get_property_by_id(
            &self,
            id: PropertyId,
            org_id: OrgId,
        ) -> RepositoryResult<Option<Property>>;
        fn list_properties(
            &self,
            client_id: ClientId,
            org_id: OrgId,
        ) -> RepositoryResult<Vec<Property>>;
    }

    impl PropertyWriter for Repository {
        fn create_property(&self, property: &NewProperty) -> RepositoryResult<Property>;
    }

    impl ClaimReader for Repository {
        fn get_claim_by_id(&self, id: ClaimId, org_id: OrgId) -> RepositoryResult<Option<Claim>>;
        fn list_claims(&self, query: ClaimListQuery) -> RepositoryResult<(usize, Vec<Claim>)>;
        fn check_claim_assigned_to_member(
            &self,
            claim_id: ClaimId,
            org_id: OrgId,
            email: &MemberEmail,
        ) -> RepositoryResult<bool>;
    }

    impl ClaimWriter for Repository {
        fn create_claim(&self, claim: &NewClaim) -> RepositoryResult<Claim>;
        fn update_claim(
            &self,
            id: ClaimId,
            org_id: OrgId,
            updates: &UpdateClaim,
        ) -> RepositoryResult<Claim>;
        fn update_claim_status(
            &self,
            id: ClaimId,
            org_id: OrgId,
            status: ClaimStatus,
        ) -> RepositoryResult<Claim>;
    }

    impl ClaimEventReader for Repository {
        fn list_claim_events(
            &self,
            query: ClaimEventListQuery,
        ) -> RepositoryResult<(usize, Vec<(ClaimEvent, Member)>)>;
        fn get_claim_event(
            &self,
            id: ClaimEventId,
            org_id: OrgId,
        ) -> RepositoryResult<Option<ClaimEvent>>;
    }

    impl ClaimEventWriter for Repository {
        fn create_claim_event(
            &self,
            event: &NewClaimEvent,
            org_id: OrgId,
        ) -> RepositoryResult<ClaimEvent>;
    }

    impl EstimateReader for Repository {
        fn get_estimate_by_id(
            &self,
            id: EstimateId,
            org_id: OrgId,
        ) -> RepositoryResult<Option<Estimate>>;
        fn list_estimates(
            &self,
            claim_id: ClaimId,
            org_id: OrgId,
        ) -> RepositoryResult<Vec<Estimate>>;
    }

    impl EstimateWriter for Repository {
        fn create_estimate(&self, estimate: &NewEstimate) -> RepositoryResult<Estimate>;
        fn update_estimate_status(
            &self,
            id: EstimateId,
            org_id: OrgId,
            status: EstimateStatus,
        ) -> RepositoryResult<Estimate>;
    }

    impl LeadReader for Repository {
        fn get_lead_by_id(&self, id: LeadId, org_id: OrgId) -> RepositoryResult<Option<Lead>>;
        fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)>;
    }

    impl LeadWriter for Repository {
        fn create_lead(&self, lead: &NewLead) -> RepositoryResult<Lead>;
        fn update_lead_status(
            &self,
            id: LeadId,
            org_id: OrgId,
            status: LeadStatus,
        ) -> RepositoryResult<Lead>;
        fn convert_lead(
            &self,
            id: LeadId,
            org_id: OrgId,
            client: &NewClient,
        ) -> RepositoryResult<(Lead, Client)>;
    }

    impl JobReader for Repository {
        fn get_job_by_id(&self, id: JobId, org_id: OrgId) -> RepositoryResult<Option<Job>>;
        fn list_jobs(&self, query: JobListQuery) -> RepositoryResult<Vec<Job>>;
        fn find_crew_conflicts(
            &self,
            org_id: OrgId,
            crew: &str,
            window: &TimeWindow,
            exclude: Option<JobId>,
        ) -> RepositoryResult<Vec<Job>>;
    }

    impl JobWriter for Repository {
        fn create_job(&self, job: &NewJob) -> RepositoryResult<Job>;
        fn update_job_status(
            &self,
            id: JobId,
            org_id: OrgId,
            status: JobStatus,
        ) -> RepositoryResult<Job>;
    }

    impl NotificationReader for Repository {
        fn list_notifications(
            &self,
            query: NotificationListQuery,
        ) -> RepositoryResult<Vec<Notification>>;
    }

    impl NotificationWriter for Repository {
        fn create_notification(
            &self,
            notification: &NewNotification,
        ) -> RepositoryResult<Notification>;
        fn mark_notification_read(
            &self,
            id: NotificationId,
            org_id: OrgId,
            member_id: MemberId,
        ) -> RepositoryResult<Notification>;
        fn mark_all_notifications_read(
            &self,
            org_id: OrgId,
            member_id: MemberId,
        ) -> RepositoryResult<usize>;
    }

    impl WebhookReader for Repository {
        fn get_webhook_by_id(
            &self,
            id: WebhookId,
            org_id: OrgId,
        ) -> RepositoryResult<Option<Webhook>>;
        fn list_webhooks(&self, org_id: OrgId) -> RepositoryResult<Vec<Webhook>>;
        fn list_webhooks_for_event(
            &self,
            org_id: OrgId,
            event: WebhookEvent,
        ) -> RepositoryResult<Vec<Webhook>>;
        fn list_deliveries(
            &self,
            webhook_id: WebhookId,
            org_id: OrgId,
            limit: i64,
        ) -> RepositoryResult<Vec<WebhookDelivery>>;
        fn list_failed_deliveries(
            &self,
            limit: i64,
        ) -> RepositoryResult<Vec<(WebhookDelivery, Webhook)>>;
    }

    impl WebhookWriter for Repository {
        fn create_webhook(&self, webhook: &NewWebhook) -> RepositoryResult<Webhook>;
        fn delete_webhook(&self, id: WebhookId, org_id: OrgId) -> RepositoryResult<()>;
        fn enable_webhook(&self, id: WebhookId, org_id: OrgId) -> RepositoryResult<Webhook>;
        fn create_delivery(
            &self,
            delivery: &NewWebhookDelivery,
        ) -> RepositoryResult<WebhookDelivery>;
        fn finish_delivery(
            &self,
            id: DeliveryId,
            outcome: &DeliveryOutcome,
        ) -> RepositoryResult<WebhookDelivery>;
        fn record_webhook_success(&self, id: WebhookId) -> RepositoryResult<Webhook>;
        fn record_webhook_failure(&self, id: WebhookId) -> RepositoryResult<Webhook>;
    }

    impl StripeEventWriter for Repository {
        fn record_stripe_event(&self, event_id: &str, event_type: &str) -> RepositoryResult<bool>;
        fn forget_stripe_event(&self, event_id: &str) -> RepositoryResult<()>;
    }

    impl DepreciationReader for Repository {
        fn get_depreciation_item(
            &self,
            id: DepreciationItemId,
            org_id: OrgId,
        ) -> RepositoryResult<Option<DepreciationItem>>;
        fn list_depreciation_items(
            &self,
            claim_id: ClaimId,
            org_id: OrgId,
        ) -> RepositoryResult<Vec<DepreciationItem>>;
        fn list_depreciation_events(
            &self,
            item_id: DepreciationItemId,
            org_id: OrgId,
        ) -> RepositoryResult<Vec<DepreciationEvent>>;
    }

    impl DepreciationWriter for Repository {
        fn create_depreciation_item(
            &self,
            item: &NewDepreciationItem,
        ) -> RepositoryResult<DepreciationItem>;
        fn transition_depreciation_item(
            &self,
            id: DepreciationItemId,
            org_id: OrgId,
            from: DepreciationStatus,
            to: DepreciationStatus,
            note: Option<String>,
        ) -> RepositoryResult<DepreciationItem>;
    }
}
