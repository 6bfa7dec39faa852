//! Claim payloads: creation, edits, status changes and timeline notes.

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::claim::{ClaimStatus, DamageType, NewClaim, UpdateClaim};
use crate::domain::claim_event::ClaimEventType;
use crate::domain::types::{
    CarrierName, Cents, ClaimNumber, ClientId, NoteText, OrgId, PropertyId,
};
use crate::forms::{FormError, non_blank};

fn parse_damage_type(value: &str) -> Result<DamageType, FormError> {
    value
        .trim()
        .parse()
        .map_err(|_| FormError::InvalidValue(format!("unknown damage type: {value}")))
}

fn parse_property(value: Option<i32>) -> Result<Option<PropertyId>, FormError> {
    value
        .map(|id| PropertyId::new(id).map_err(|_| FormError::InvalidId))
        .transpose()
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewClaimForm {
    pub client_id: i32,
    #[serde(default)]
    pub property_id: Option<i32>,
    #[validate(length(min = 1, max = 64))]
    pub claim_number: String,
    #[validate(length(min = 1, max = 120))]
    pub carrier: String,
    #[serde(default)]
    pub policy_number: Option<String>,
    pub damage_type: String,
    #[serde(default)]
    pub date_of_loss: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
}

pub struct NewClaimPayload {
    pub client_id: ClientId,
    pub property_id: Option<PropertyId>,
    pub claim_number: ClaimNumber,
    pub carrier: CarrierName,
    pub policy_number: Option<String>,
    pub damage_type: DamageType,
    pub date_of_loss: Option<NaiveDate>,
    pub description: Option<String>,
}

impl TryFrom<NewClaimForm> for NewClaimPayload {
    type Error = FormError;

    fn try_from(form: NewClaimForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            client_id: ClientId::new(form.client_id).map_err(|_| FormError::InvalidId)?,
            property_id: parse_property(form.property_id)?,
            claim_number: ClaimNumber::new(form.claim_number)?,
            carrier: CarrierName::new(form.carrier)?,
            policy_number: non_blank(form.policy_number),
            damage_type: parse_damage_type(&form.damage_type)?,
            date_of_loss: form.date_of_loss,
            description: non_blank(form.description).map(|d| ammonia::clean(&d)),
        })
    }
}

impl NewClaimPayload {
    pub fn into_domain(self, org_id: OrgId) -> NewClaim {
        NewClaim {
            org_id,
            client_id: self.client_id,
            property_id: self.property_id,
            claim_number: self.claim_number,
            carrier: self.carrier,
            policy_number: self.policy_number,
            damage_type: self.damage_type,
            date_of_loss: self.date_of_loss,
            description: self.description,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClaimForm {
    #[serde(default)]
    pub property_id: Option<i32>,
    #[validate(length(min = 1, max = 120))]
    pub carrier: String,
    #[serde(default)]
    pub policy_number: Option<String>,
    pub damage_type: String,
    #[serde(default)]
    pub date_of_loss: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    /// Amount approved by the carrier, in cents.
    #[serde(default)]
    pub approved_amount: Option<i64>,
}

impl TryFrom<UpdateClaimForm> for UpdateClaim {
    type Error = FormError;

    fn try_from(form: UpdateClaimForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(UpdateClaim {
            property_id: parse_property(form.property_id)?,
            carrier: CarrierName::new(form.carrier)?,
            policy_number: non_blank(form.policy_number),
            damage_type: parse_damage_type(&form.damage_type)?,
            date_of_loss: form.date_of_loss,
            description: non_blank(form.description).map(|d| ammonia::clean(&d)),
            approved_amount: form.approved_amount.map(Cents::new).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusForm {
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
}

pub struct ChangeStatusPayload {
    pub status: ClaimStatus,
    pub note: Option<NoteText>,
}

impl TryFrom<ChangeStatusForm> for ChangeStatusPayload {
    type Error = FormError;

    fn try_from(form: ChangeStatusForm) -> Result<Self, Self::Error> {
        let status = form
            .status
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidStatus(form.status.clone()))?;
        let note = non_blank(form.note).map(NoteText::new).transpose()?;
        Ok(Self { status, note })
    }
}

/// Manual timeline entry such as a note or a logged call.
#[derive(Debug, Deserialize, Validate)]
pub struct AddClaimEventForm {
    #[validate(length(min = 1, max = 10_000))]
    pub text: String,
    #[serde(default)]
    pub event_type: Option<String>,
}

pub struct AddClaimEventPayload {
    pub text: NoteText,
    pub event_type: ClaimEventType,
}

impl TryFrom<AddClaimEventForm> for AddClaimEventPayload {
    type Error = FormError;

    fn try_from(form: AddClaimEventForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let event_type = non_blank(form.event_type)
            .map(ClaimEventType::from)
            .unwrap_or(ClaimEventType::Note);
        // These are written by the service itself.
        if matches!(
            event_type,
            ClaimEventType::StatusChange | ClaimEventType::GeneratedDocument
        ) {
            return Err(FormError::InvalidValue(format!(
                "{event_type} events cannot be added manually"
            )));
        }
        Ok(Self {
            text: NoteText::new(form.text)?,
            event_type,
        })
    }
}

/// Query string of the claim list.
#[derive(Debug, Default, Deserialize)]
pub struct ClaimListParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

/// Query string of the claim timeline.
#[derive(Debug, Default, Deserialize)]
pub struct TimelineParams {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_claim_form() -> NewClaimForm {
        NewClaimForm {
            client_id: 3,
            property_id: Some(9),
            claim_number: " HX-2024-0042 ".to_string(),
            carrier: "State Farm".to_string(),
            policy_number: Some("".to_string()),
            damage_type: "Hail".to_string(),
            date_of_loss: NaiveDate::from_ymd_opt(2024, 5, 14),
            description: Some("<script>x</script>Hail on north slope".to_string()),
        }
    }

    #[test]
    fn new_claim_form_is_normalized_and_sanitized() {
        let payload = NewClaimPayload::try_from(new_claim_form()).unwrap();
        assert_eq!(payload.claim_number.as_str(), "HX-2024-0042");
        assert_eq!(payload.policy_number, None);
        assert_eq!(payload.damage_type, DamageType::Hail);
        assert_eq!(payload.description.as_deref(), Some("Hail on north slope"));
    }

    #[test]
    fn unknown_damage_type_is_rejected() {
        let mut form = new_claim_form();
        form.damage_type = "Meteor".to_string();
        assert!(matches!(
            NewClaimPayload::try_from(form),
            Err(FormError::InvalidValue(_))
        ));
    }

    #[test]
    fn status_form_parses_status() {
        let payload = ChangeStatusPayload::try_from(ChangeStatusForm {
            status: "Inspected".to_string(),
            note: Some("  ".to_string()),
        })
        .unwrap();
        assert_eq!(payload.status, ClaimStatus::Inspected);
        assert!(payload.note.is_none());

        assert!(matches!(
            ChangeStatusPayload::try_from(ChangeStatusForm {
                status: "Paid".to_string(),
                note: None,
            }),
            Err(FormError::InvalidStatus(_))
        ));
    }

    #[test]
    fn manual_events_default_to_notes_and_are_sanitized() {
        let payload = AddClaimEventPayload::try_from(AddClaimEventForm {
            text: "Called adjuster <b>twice</b><img src=x onerror=alert(1)>".to_string(),
            event_type: None,
        })
        .unwrap();
        assert_eq!(payload.event_type, ClaimEventType::Note);
        assert!(!payload.text.as_str().contains("onerror"));
    }

    #[test]
    fn status_change_events_cannot_be_forged() {
        let result = AddClaimEventPayload::try_from(AddClaimEventForm {
            text: "moved".to_string(),
            event_type: Some("StatusChange".to_string()),
        });
        assert!(matches!(result, Err(FormError::InvalidValue(_))));
    }
}
