//! Persistence traits and their Diesel implementation.
//!
//! Every method touching a tenant-owned table takes the caller's [`OrgId`];
//! implementations must scope the query by it, either directly or through
//! the parent row for child tables.

use chrono::NaiveDateTime;

use crate::db::{DbConnection, DbPool};
use crate::domain::claim::{Claim, ClaimStatus, NewClaim, UpdateClaim};
use crate::domain::claim_event::{ClaimEvent, ClaimEventType, NewClaimEvent};
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

pub mod claim;
pub mod claim_event;
pub mod client;
pub mod depreciation;
pub mod errors;
pub mod estimate;
pub mod job;
pub mod lead;
pub mod member;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod notification;
pub mod organization;
pub mod property;
pub mod stripe_event;
pub mod webhook;

/// Diesel-backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub(crate) fn limit_offset(&self) -> (i64, i64) {
        let page = self.page.max(1) as i64;
        let per_page = self.per_page.max(1) as i64;
        (per_page, (page - 1) * per_page)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientListQuery {
    pub org_id: OrgId,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl ClientListQuery {
    pub fn new(org_id: OrgId) -> Self {
        Self {
            org_id,
            search: None,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClaimListQuery {
    pub org_id: OrgId,
    pub status: Option<ClaimStatus>,
    pub search: Option<String>,
    /// Restricts the list to claims assigned to this member.
    pub assigned_to: Option<MemberEmail>,
    pub pagination: Option<Pagination>,
}

impl ClaimListQuery {
    pub fn new(org_id: OrgId) -> Self {
        Self {
            org_id,
            status: None,
            search: None,
            assigned_to: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: ClaimStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn assigned_to(mut self, email: MemberEmail) -> Self {
        self.assigned_to = Some(email);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClaimEventListQuery {
    pub org_id: OrgId,
    pub claim_id: ClaimId,
    pub event_type: Option<ClaimEventType>,
    pub pagination: Option<Pagination>,
}

impl ClaimEventListQuery {
    pub fn new(org_id: OrgId, claim_id: ClaimId) -> Self {
        Self {
            org_id,
            claim_id,
            event_type: None,
            pagination: None,
        }
    }

    pub fn event_type(mut self, event_type: ClaimEventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeadListQuery {
    pub org_id: OrgId,
    pub status: Option<LeadStatus>,
    pub pagination: Option<Pagination>,
}

impl LeadListQuery {
    pub fn new(org_id: OrgId) -> Self {
        Self {
            org_id,
            status: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Jobs starting inside `[from, to)`, optionally for a single claim.
#[derive(Debug, Clone, PartialEq)]
pub struct JobListQuery {
    pub org_id: OrgId,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
    pub claim_id: Option<ClaimId>,
    /// Restricts the list to jobs on claims assigned to this member.
    pub assigned_to: Option<MemberEmail>,
}

impl JobListQuery {
    pub fn new(org_id: OrgId) -> Self {
        Self {
            org_id,
            from: None,
            to: None,
            claim_id: None,
            assigned_to: None,
        }
    }

    pub fn assigned_to(mut self, email: MemberEmail) -> Self {
        self.assigned_to = Some(email);
        self
    }

    pub fn range(mut self, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn claim(mut self, claim_id: ClaimId) -> Self {
        self.claim_id = Some(claim_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationListQuery {
    pub org_id: OrgId,
    pub member_id: MemberId,
    pub unread_only: bool,
}

pub trait OrganizationReader {
    fn get_organization(&self, org_id: OrgId) -> RepositoryResult<Option<Organization>>;
    fn get_organization_by_customer(
        &self,
        stripe_customer_id: &str,
    ) -> RepositoryResult<Option<Organization>>;
    fn get_branding(&self, org_id: OrgId) -> RepositoryResult<Option<Branding>>;
}

pub trait OrganizationWriter {
    /// Inserts the organization when missing and returns the stored row.
    fn ensure_organization(&self, org: &NewOrganization) -> RepositoryResult<Organization>;
    fn update_subscription(
        &self,
        org_id: OrgId,
        update: &SubscriptionUpdate,
    ) -> RepositoryResult<Organization>;
    fn upsert_branding(&self, org_id: OrgId, branding: &UpdateBranding)
    -> RepositoryResult<Branding>;
}

pub trait MemberReader {
    fn get_member_by_id(&self, id: MemberId, org_id: OrgId) -> RepositoryResult<Option<Member>>;
    fn get_member_by_email(
        &self,
        email: &MemberEmail,
        org_id: OrgId,
    ) -> RepositoryResult<Option<Member>>;
    fn list_members(&self, org_id: OrgId) -> RepositoryResult<Vec<Member>>;
    fn list_claim_assignees(&self, claim_id: ClaimId, org_id: OrgId)
    -> RepositoryResult<Vec<Member>>;
}

pub trait MemberWriter {
    fn create_or_update_member(&self, member: &NewMember) -> RepositoryResult<Member>;
    /// Replaces the assignee set of a claim, returning the number assigned.
    fn assign_members_to_claim(
        &self,
        claim_id: ClaimId,
        org_id: OrgId,
        member_ids: &[MemberId],
    ) -> RepositoryResult<usize>;
}

pub trait ClientReader {
    fn get_client_by_id(&self, id: ClientId, org_id: OrgId) -> RepositoryResult<Option<Client>>;
    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
}

pub trait ClientWriter {
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

pub trait PropertyReader {
    fn get_property_by_id(
        &self,
        id: PropertyId,
        org_id: OrgId,
    ) -> RepositoryResult<Option<Property>>;
    fn list_properties(&self, client_id: ClientId, org_id: OrgId)
    -> RepositoryResult<Vec<Property>>;
}

pub trait PropertyWriter {
    fn create_property(&self, property: &NewProperty) -> RepositoryResult<Property>;
}

pub trait ClaimReader {
    fn get_claim_by_id(&self, id: ClaimId, org_id: OrgId) -> RepositoryResult<Option<Claim>>;
    fn list_claims(&self, query: ClaimListQuery) -> RepositoryResult<(usize, Vec<Claim>)>;
    fn check_claim_assigned_to_member(
        &self,
        claim_id: ClaimId,
        org_id: OrgId,
        email: &MemberEmail,
    ) -> RepositoryResult<bool>;
}

pub trait ClaimWriter {
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

pub trait ClaimEventReader {
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

pub trait ClaimEventWriter {
    fn create_claim_event(
        &self,
        event: &NewClaimEvent,
        org_id: OrgId,
    ) -> RepositoryResult<ClaimEvent>;
}

pub trait EstimateReader {
    fn get_estimate_by_id(&self, id: EstimateId, org_id: OrgId)
    -> RepositoryResult<Option<Estimate>>;
    fn list_estimates(&self, claim_id: ClaimId, org_id: OrgId) -> RepositoryResult<Vec<Estimate>>;
}

pub trait EstimateWriter {
    /// Stores the estimate and its items with server-computed totals.
    fn create_estimate(&self, estimate: &NewEstimate) -> RepositoryResult<Estimate>;
    fn update_estimate_status(
        &self,
        id: EstimateId,
        org_id: OrgId,
        status: EstimateStatus,
    ) -> RepositoryResult<Estimate>;
}

pub trait LeadReader {
    fn get_lead_by_id(&self, id: LeadId, org_id: OrgId) -> RepositoryResult<Option<Lead>>;
    fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)>;
}

pub trait LeadWriter {
    fn create_lead(&self, lead: &NewLead) -> RepositoryResult<Lead>;
    fn update_lead_status(
        &self,
        id: LeadId,
        org_id: OrgId,
        status: LeadStatus,
    ) -> RepositoryResult<Lead>;
    /// Creates the client and marks the lead converted in one transaction.
    fn convert_lead(
        &self,
        id: LeadId,
        org_id: OrgId,
        client: &NewClient,
    ) -> RepositoryResult<(Lead, Client)>;
}

pub trait JobReader {
    fn get_job_by_id(&self, id: JobId, org_id: OrgId) -> RepositoryResult<Option<Job>>;
    fn list_jobs(&self, query: JobListQuery) -> RepositoryResult<Vec<Job>>;
    /// Jobs of `crew` that still hold the crew and overlap `window`.
    fn find_crew_conflicts(
        &self,
        org_id: OrgId,
        crew: &str,
        window: &TimeWindow,
        exclude: Option<JobId>,
    ) -> RepositoryResult<Vec<Job>>;
}

pub trait JobWriter {
    fn create_job(&self, job: &NewJob) -> RepositoryResult<Job>;
    fn update_job_status(&self, id: JobId, org_id: OrgId, status: JobStatus)
    -> RepositoryResult<Job>;
}

pub trait NotificationReader {
    fn list_notifications(
        &self,
        query: NotificationListQuery,
    ) -> RepositoryResult<Vec<Notification>>;
}

pub trait NotificationWriter {
    fn create_notification(&self, notification: &NewNotification)
    -> RepositoryResult<Notification>;
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

pub trait WebhookReader {
    fn get_webhook_by_id(&self, id: WebhookId, org_id: OrgId) -> RepositoryResult<Option<Webhook>>;
    fn list_webhooks(&self, org_id: OrgId) -> RepositoryResult<Vec<Webhook>>;
    /// Active webhooks of the organization subscribed to `event`.
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
    /// Failed deliveries of active webhooks across every organization.
    /// Deliveries rejected with a non-retryable 4xx status are left alone.
    ///
    /// Used by the retry worker only; each pair carries its own `org_id`.
    fn list_failed_deliveries(&self, limit: i64)
    -> RepositoryResult<Vec<(WebhookDelivery, Webhook)>>;
}

pub trait WebhookWriter {
    fn create_webhook(&self, webhook: &NewWebhook) -> RepositoryResult<Webhook>;
    fn delete_webhook(&self, id: WebhookId, org_id: OrgId) -> RepositoryResult<()>;
    /// Re-activates a webhook and clears its failure counter.
    fn enable_webhook(&self, id: WebhookId, org_id: OrgId) -> RepositoryResult<Webhook>;
    fn create_delivery(&self, delivery: &NewWebhookDelivery) -> RepositoryResult<WebhookDelivery>;
    fn finish_delivery(
        &self,
        id: DeliveryId,
        outcome: &DeliveryOutcome,
    ) -> RepositoryResult<WebhookDelivery>;
    /// Resets the failure counter after a successful delivery.
    fn record_webhook_success(&self, id: WebhookId) -> RepositoryResult<Webhook>;
    /// Increments the failure counter, disabling the webhook at the limit.
    fn record_webhook_failure(&self, id: WebhookId) -> RepositoryResult<Webhook>;
}

pub trait StripeEventWriter {
    /// Records a processed event id. Returns `false` when it was already seen.
    fn record_stripe_event(&self, event_id: &str, event_type: &str) -> RepositoryResult<bool>;
    /// Removes a recorded event id so a redelivery is processed again.
    fn forget_stripe_event(&self, event_id: &str) -> RepositoryResult<()>;
}

pub trait DepreciationReader {
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

pub trait DepreciationWriter {
    fn create_depreciation_item(
        &self,
        item: &NewDepreciationItem,
    ) -> RepositoryResult<DepreciationItem>;
    /// Moves an item from `from` to `to` and logs the change.
    ///
    /// Fails with `NotFound` when the item is no longer in `from`.
    fn transition_depreciation_item(
        &self,
        id: DepreciationItemId,
        org_id: OrgId,
        from: DepreciationStatus,
        to: DepreciationStatus,
        note: Option<String>,
    ) -> RepositoryResult<DepreciationItem>;
}
