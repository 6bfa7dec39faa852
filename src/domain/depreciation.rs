//! Recoverable depreciation (RCV vs ACV) tracking for claim line items.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Cents, ClaimId, DepreciationEventId, DepreciationItemId, LineDescription, OrgId, Rate,
    TypeConstraintError,
};

status_enum!(
    /// Recovery workflow for withheld depreciation.
    DepreciationStatus {
        Calculated,
        Requested,
        Approved,
        Disputed,
        Received,
    }
);

impl DepreciationStatus {
    pub fn can_transition_to(self, next: DepreciationStatus) -> bool {
        use DepreciationStatus::*;
        matches!(
            (self, next),
            (Calculated, Requested)
                | (Requested, Approved)
                | (Requested, Disputed)
                | (Disputed, Requested)
                | (Approved, Received)
        )
    }
}

/// Item age in years; fractional ages are allowed.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct AgeYears(f64);

impl AgeYears {
    pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::InvalidValue(
                "age must be a non-negative number of years".to_string(),
            ))
        }
    }

    pub const fn get(self) -> f64 {
        self.0
    }
}

/// `round(value × (1 - rate)^years)`.
pub fn depreciated_value(original: Cents, rate: Rate, age: AgeYears) -> Cents {
    let factor = (1.0 - rate.get()).powf(age.get());
    let value = (original.get() as f64 * factor).round() as i64;
    Cents::new(value.clamp(0, original.get())).unwrap_or_default()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DepreciationItem {
    pub id: DepreciationItemId,
    pub org_id: OrgId,
    pub claim_id: ClaimId,
    pub description: LineDescription,
    pub original_value: Cents,
    pub annual_rate: Rate,
    pub age: AgeYears,
    pub status: DepreciationStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl DepreciationItem {
    /// Actual cash value after depreciation.
    pub fn current_value(&self) -> Cents {
        depreciated_value(self.original_value, self.annual_rate, self.age)
    }

    /// Amount withheld by the carrier and recoverable on completion.
    pub fn recoverable(&self) -> Cents {
        Cents::new(self.original_value.get() - self.current_value().get()).unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewDepreciationItem {
    pub org_id: OrgId,
    pub claim_id: ClaimId,
    pub description: LineDescription,
    pub original_value: Cents,
    pub annual_rate: Rate,
    pub age: AgeYears,
}

/// Logged status change of a depreciation item.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DepreciationEvent {
    pub id: DepreciationEventId,
    pub item_id: DepreciationItemId,
    pub from_status: Option<DepreciationStatus>,
    pub to_status: DepreciationStatus,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}
