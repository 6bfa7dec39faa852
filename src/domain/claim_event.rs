use std::fmt::Display;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{ClaimEventId, ClaimId, MemberId, TypeConstraintError};

/// Entry on a claim's timeline.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClaimEvent {
    pub id: ClaimEventId,
    pub claim_id: ClaimId,
    pub member_id: MemberId,
    pub event_type: ClaimEventType,
    pub event_data: Value,
    pub created_at: NaiveDateTime,
}

impl ClaimEvent {
    pub fn try_new(
        id: i32,
        claim_id: i32,
        member_id: i32,
        event_type: impl Into<ClaimEventType>,
        event_data: Value,
        created_at: NaiveDateTime,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            id: ClaimEventId::new(id)?,
            claim_id: ClaimId::new(claim_id)?,
            member_id: MemberId::new(member_id)?,
            event_type: event_type.into(),
            event_data,
            created_at,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ClaimEventType {
    Note,
    StatusChange,
    Document,
    GeneratedDocument,
    Call,
    Email,
    Other(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewClaimEvent {
    pub claim_id: ClaimId,
    pub member_id: MemberId,
    pub event_type: ClaimEventType,
    pub event_data: Value,
    pub created_at: NaiveDateTime,
}

impl NewClaimEvent {
    #[must_use]
    pub fn new(
        claim_id: ClaimId,
        member_id: MemberId,
        event_type: ClaimEventType,
        event_data: Value,
    ) -> Self {
        Self {
            claim_id,
            member_id,
            event_type,
            event_data,
            created_at: Utc::now().naive_utc(),
        }
    }
}

impl Display for ClaimEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimEventType::Note => write!(f, "Note"),
            ClaimEventType::StatusChange => write!(f, "StatusChange"),
            ClaimEventType::Document => write!(f, "Document"),
            ClaimEventType::GeneratedDocument => write!(f, "GeneratedDocument"),
            ClaimEventType::Call => write!(f, "Call"),
            ClaimEventType::Email => write!(f, "Email"),
            ClaimEventType::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for ClaimEventType {
    fn from(s: &str) -> Self {
        match s {
            "Note" => ClaimEventType::Note,
            "StatusChange" => ClaimEventType::StatusChange,
            "Document" => ClaimEventType::Document,
            "GeneratedDocument" => ClaimEventType::GeneratedDocument,
            "Call" => ClaimEventType::Call,
            "Email" => ClaimEventType::Email,
            _ => ClaimEventType::Other(s.to_string()),
        }
    }
}

impl From<String> for ClaimEventType {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_event_types_are_preserved() {
        let event_type = ClaimEventType::from("Drone Survey");
        assert_eq!(event_type, ClaimEventType::Other("Drone Survey".to_string()));
        assert_eq!(event_type.to_string(), "Drone Survey");
        assert_eq!(ClaimEventType::from("GeneratedDocument"), ClaimEventType::GeneratedDocument);
    }
}
