//! Insurance claims and their status workflow.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CarrierName, Cents, ClaimId, ClaimNumber, ClientId, OrgId, PropertyId,
};

status_enum!(
    /// Lifecycle of an insurance claim.
    ClaimStatus {
        New,
        Inspected,
        Filed,
        Approved,
        Denied,
        Supplemented,
        Closed,
    }
);

impl ClaimStatus {
    /// Whether the workflow allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self, next),
            (New, Inspected)
                | (New, Closed)
                | (Inspected, Filed)
                | (Inspected, Closed)
                | (Filed, Approved)
                | (Filed, Denied)
                | (Approved, Supplemented)
                | (Approved, Closed)
                | (Denied, Supplemented)
                | (Denied, Closed)
                | (Supplemented, Approved)
                | (Supplemented, Denied)
                | (Supplemented, Closed)
        )
    }
}

status_enum!(
    /// Peril that caused the loss.
    DamageType {
        Hail,
        Wind,
        Hurricane,
        Tornado,
        Fire,
        Water,
        Other,
    }
);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Claim {
    pub id: ClaimId,
    pub org_id: OrgId,
    pub client_id: ClientId,
    pub property_id: Option<PropertyId>,
    pub claim_number: ClaimNumber,
    pub carrier: CarrierName,
    pub policy_number: Option<String>,
    pub status: ClaimStatus,
    pub damage_type: DamageType,
    pub date_of_loss: Option<NaiveDate>,
    pub description: Option<String>,
    pub approved_amount: Option<Cents>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewClaim {
    pub org_id: OrgId,
    pub client_id: ClientId,
    pub property_id: Option<PropertyId>,
    pub claim_number: ClaimNumber,
    pub carrier: CarrierName,
    pub policy_number: Option<String>,
    pub damage_type: DamageType,
    pub date_of_loss: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateClaim {
    pub property_id: Option<PropertyId>,
    pub carrier: CarrierName,
    pub policy_number: Option<String>,
    pub damage_type: DamageType,
    pub date_of_loss: Option<NaiveDate>,
    pub description: Option<String>,
    pub approved_amount: Option<Cents>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_is_terminal() {
        for next in ClaimStatus::ALL {
            assert!(!ClaimStatus::Closed.can_transition_to(*next));
        }
    }

    #[test]
    fn filed_claims_resolve_to_approved_or_denied() {
        assert!(ClaimStatus::Filed.can_transition_to(ClaimStatus::Approved));
        assert!(ClaimStatus::Filed.can_transition_to(ClaimStatus::Denied));
        assert!(!ClaimStatus::Filed.can_transition_to(ClaimStatus::New));
        assert!(!ClaimStatus::New.can_transition_to(ClaimStatus::Approved));
    }

    #[test]
    fn statuses_round_trip_through_strings() {
        assert_eq!("Supplemented".parse(), Ok(ClaimStatus::Supplemented));
        assert!("supplemented".parse::<ClaimStatus>().is_err());
        assert_eq!(DamageType::Hail.to_string(), "Hail");
    }
}
