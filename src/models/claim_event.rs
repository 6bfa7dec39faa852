//! Diesel models for storing claim timeline events.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::claim_event::{
    ClaimEvent as DomainClaimEvent, NewClaimEvent as DomainNewClaimEvent,
};
use crate::domain::types::TypeConstraintError;
use crate::models::claim::Claim;
use crate::models::member::Member;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Claim, foreign_key = claim_id))]
#[diesel(belongs_to(Member, foreign_key = member_id))]
#[diesel(table_name = crate::schema::claim_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ClaimEvent {
    pub id: i32,
    pub claim_id: i32,
    pub member_id: i32,
    pub event_type: String,
    pub event_data: String, // JSON text
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::claim_events)]
pub struct NewClaimEvent {
    pub claim_id: i32,
    pub member_id: i32,
    pub event_type: String,
    pub event_data: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<ClaimEvent> for DomainClaimEvent {
    type Error = TypeConstraintError;

    fn try_from(event: ClaimEvent) -> Result<Self, Self::Error> {
        let event_data = serde_json::from_str(&event.event_data).unwrap_or_default();

        DomainClaimEvent::try_new(
            event.id,
            event.claim_id,
            event.member_id,
            event.event_type,
            event_data,
            event.created_at,
        )
    }
}

impl<'a> From<&'a DomainNewClaimEvent> for NewClaimEvent {
    fn from(event: &'a DomainNewClaimEvent) -> Self {
        Self {
            claim_id: event.claim_id.get(),
            member_id: event.member_id.get(),
            event_type: event.event_type.to_string(),
            event_data: event.event_data.to_string(),
            created_at: event.created_at,
        }
    }
}
