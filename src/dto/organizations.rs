//! DTOs describing the caller's organization.

use serde::Serialize;

use crate::domain::member::Member;
use crate::domain::organization::{Branding, Organization};

/// Organization with its subscription state.
#[derive(Debug, Serialize)]
pub struct OrgOverview {
    pub organization: Organization,
    /// Whether the subscription currently grants access to paid features.
    pub entitled: bool,
    pub branding: Branding,
}

/// Result of opening a session.
#[derive(Debug, Serialize)]
pub struct SessionData {
    pub organization: Organization,
    pub member: Member,
}
