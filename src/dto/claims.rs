//! DTOs for the claim detail view and timeline.

use serde::Serialize;

use crate::domain::claim::Claim;
use crate::domain::claim_event::ClaimEvent;
use crate::domain::client::Client;
use crate::domain::estimate::Estimate;
use crate::domain::member::Member;
use crate::domain::property::Property;

#[derive(Debug, Serialize)]
pub struct ClaimDetail {
    pub claim: Claim,
    pub client: Option<Client>,
    pub property: Option<Property>,
    pub assignees: Vec<Member>,
    pub estimates: Vec<Estimate>,
}

/// Timeline event together with the member who recorded it.
#[derive(Debug, Serialize)]
pub struct TimelineEntry {
    #[serde(flatten)]
    pub event: ClaimEvent,
    pub author: String,
}

impl From<(ClaimEvent, Member)> for TimelineEntry {
    fn from((event, member): (ClaimEvent, Member)) -> Self {
        Self {
            event,
            author: member.name.into_inner(),
        }
    }
}
