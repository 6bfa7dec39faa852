//! Repair estimates and their server-computed totals.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Cents, ClaimId, EstimateId, EstimateItemId, LineDescription, OrgId, Rate, Title,
    TypeConstraintError,
};

status_enum!(
    EstimateStatus {
        Draft,
        Sent,
        Approved,
        Rejected,
    }
);

impl EstimateStatus {
    pub fn can_transition_to(self, next: EstimateStatus) -> bool {
        use EstimateStatus::*;
        matches!(
            (self, next),
            (Draft, Sent) | (Sent, Approved) | (Sent, Rejected) | (Rejected, Draft)
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Estimate {
    pub id: EstimateId,
    pub org_id: OrgId,
    pub claim_id: ClaimId,
    pub title: Title,
    pub status: EstimateStatus,
    pub tax_rate: Rate,
    pub subtotal: Cents,
    pub tax: Cents,
    pub total: Cents,
    pub items: Vec<EstimateItem>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EstimateItem {
    pub id: EstimateItemId,
    pub estimate_id: EstimateId,
    pub description: LineDescription,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: Cents,
    pub total: Cents,
}

/// Line item before persistence; its total is derived, never supplied.
#[derive(Clone, Debug, PartialEq)]
pub struct NewEstimateItem {
    pub description: LineDescription,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: Cents,
}

impl NewEstimateItem {
    pub fn new(
        description: LineDescription,
        quantity: f64,
        unit: impl Into<String>,
        unit_price: Cents,
    ) -> Result<Self, TypeConstraintError> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(TypeConstraintError::InvalidValue(
                "quantity must be positive".to_string(),
            ));
        }
        let unit = unit.into().trim().to_string();
        Ok(Self {
            description,
            quantity,
            unit: if unit.is_empty() { "EA".to_string() } else { unit },
            unit_price,
        })
    }

    /// `round(quantity × unit_price)` in cents.
    pub fn line_total(&self) -> Result<Cents, TypeConstraintError> {
        let raw = (self.quantity * self.unit_price.get() as f64).round();
        // i64::MAX is not representable in f64; the cast saturates at 2^63.
        if !raw.is_finite() || raw >= i64::MAX as f64 {
            return Err(amount_overflow());
        }
        Cents::new(raw as i64)
    }
}

fn amount_overflow() -> TypeConstraintError {
    TypeConstraintError::InvalidValue("estimate amount is out of range".to_string())
}

/// Monetary summary of a set of line items.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct EstimateTotals {
    pub subtotal: Cents,
    pub tax: Cents,
    pub total: Cents,
}

impl EstimateTotals {
    /// Sums rounded line totals, then applies the tax rate to the subtotal.
    pub fn compute(items: &[NewEstimateItem], tax_rate: Rate) -> Result<Self, TypeConstraintError> {
        let mut subtotal: i64 = 0;
        for item in items {
            subtotal = subtotal
                .checked_add(item.line_total()?.get())
                .ok_or_else(amount_overflow)?;
        }
        // The rate is at most 1, so tax never exceeds the subtotal.
        let tax = (subtotal as f64 * tax_rate.get()).round() as i64;
        let total = subtotal.checked_add(tax).ok_or_else(amount_overflow)?;

        Ok(Self {
            subtotal: Cents::new(subtotal)?,
            tax: Cents::new(tax)?,
            total: Cents::new(total)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewEstimate {
    pub org_id: OrgId,
    pub claim_id: ClaimId,
    pub title: Title,
    pub tax_rate: Rate,
    pub items: Vec<NewEstimateItem>,
}

impl NewEstimate {
    pub fn totals(&self) -> Result<EstimateTotals, TypeConstraintError> {
        EstimateTotals::compute(&self.items, self.tax_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(qty: f64, price: i64) -> NewEstimateItem {
        NewEstimateItem::new(
            LineDescription::new("Laminated shingles").expect("desc"),
            qty,
            "SQ",
            Cents::new(price).expect("price"),
        )
        .expect("item")
    }

    #[test]
    fn totals_round_each_line_then_tax() {
        let items = vec![item(24.33, 28_500), item(1.0, 45_000)];
        let totals = EstimateTotals::compute(&items, Rate::new(0.0825).expect("rate")).unwrap();

        // 24.33 * 285.00 = 6934.05
        assert_eq!(totals.subtotal.get(), 693_405 + 45_000);
        assert_eq!(totals.tax.get(), 60_918);
        assert_eq!(totals.total.get(), 738_405 + 60_918);
    }

    #[test]
    fn non_positive_quantities_are_rejected() {
        let desc = LineDescription::new("Drip edge").expect("desc");
        let price = Cents::new(100).expect("price");
        assert!(NewEstimateItem::new(desc.clone(), 0.0, "LF", price).is_err());
        assert!(NewEstimateItem::new(desc, f64::INFINITY, "LF", price).is_err());
    }

    #[test]
    fn totals_reject_sums_past_the_cent_range() {
        let half = i64::MAX / 2 + 1;
        let items = vec![item(1.0, half), item(1.0, half)];

        let result = EstimateTotals::compute(&items, Rate::new(0.0).expect("rate"));
        assert!(matches!(result, Err(TypeConstraintError::InvalidValue(_))));
    }

    #[test]
    fn totals_reject_tax_past_the_cent_range() {
        let items = vec![item(1.0, i64::MAX / 4 * 3)];

        let result = EstimateTotals::compute(&items, Rate::new(0.5).expect("rate"));
        assert!(matches!(result, Err(TypeConstraintError::InvalidValue(_))));
    }

    #[test]
    fn line_total_rejects_products_past_the_cent_range() {
        let line = item(4.0, i64::MAX / 2);
        assert!(line.line_total().is_err());
    }

    #[test]
    fn approved_estimates_are_final() {
        for next in EstimateStatus::ALL {
            assert!(!EstimateStatus::Approved.can_transition_to(*next));
        }
        assert!(EstimateStatus::Rejected.can_transition_to(EstimateStatus::Draft));
    }
}
