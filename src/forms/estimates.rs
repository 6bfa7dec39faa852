use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::estimate::{EstimateStatus, EstimateTotals, NewEstimate, NewEstimateItem};
use crate::domain::types::{Cents, ClaimId, LineDescription, OrgId, Rate, Title};
use crate::forms::FormError;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EstimateItemForm {
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, max = 100_000.0))]
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    /// Price per unit in cents, capped at ten million dollars.
    #[validate(range(min = 0, max = 1_000_000_000))]
    pub unit_price: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EstimateForm {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub tax_rate: f64,
    #[validate(length(min = 1), nested)]
    pub items: Vec<EstimateItemForm>,
}

pub struct EstimatePayload {
    pub title: Title,
    pub tax_rate: Rate,
    pub items: Vec<NewEstimateItem>,
}

impl TryFrom<EstimateForm> for EstimatePayload {
    type Error = FormError;

    fn try_from(form: EstimateForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let items = form
            .items
            .into_iter()
            .map(|item| -> Result<NewEstimateItem, FormError> {
                Ok(NewEstimateItem::new(
                    LineDescription::new(item.description)?,
                    item.quantity,
                    item.unit.unwrap_or_default(),
                    Cents::new(item.unit_price)?,
                )?)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let tax_rate = Rate::new(form.tax_rate)?;
        EstimateTotals::compute(&items, tax_rate)?;

        Ok(Self {
            title: Title::new(form.title)?,
            tax_rate,
            items,
        })
    }
}

impl EstimatePayload {
    pub fn into_domain(self, org_id: OrgId, claim_id: ClaimId) -> NewEstimate {
        NewEstimate {
            org_id,
            claim_id,
            title: self.title,
            tax_rate: self.tax_rate,
            items: self.items,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EstimateStatusForm {
    pub status: String,
}

impl TryFrom<EstimateStatusForm> for EstimateStatus {
    type Error = FormError;

    fn try_from(form: EstimateStatusForm) -> Result<Self, Self::Error> {
        form.status
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidStatus(form.status.clone()))
    }
}
