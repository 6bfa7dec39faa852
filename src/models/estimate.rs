//! Diesel models for estimates and their line items.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::estimate::{
    Estimate as DomainEstimate, EstimateItem as DomainEstimateItem, EstimateTotals,
    NewEstimate as DomainNewEstimate, NewEstimateItem as DomainNewEstimateItem,
};
use crate::domain::types::{
    Cents, ClaimId, EstimateId, EstimateItemId, LineDescription, OrgId, Rate, Title,
    TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::estimates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Estimate {
    pub id: i32,
    pub org_id: i32,
    pub claim_id: i32,
    pub title: String,
    pub status: String,
    pub tax_rate: f64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Estimate, foreign_key = estimate_id))]
#[diesel(table_name = crate::schema::estimate_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EstimateItem {
    pub id: i32,
    pub estimate_id: i32,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_price_cents: i64,
    pub total_cents: i64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::estimates)]
pub struct NewEstimate<'a> {
    pub org_id: i32,
    pub claim_id: i32,
    pub title: &'a str,
    pub status: &'a str,
    pub tax_rate: f64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::estimate_items)]
pub struct NewEstimateItem<'a> {
    pub estimate_id: i32,
    pub description: &'a str,
    pub quantity: f64,
    pub unit: &'a str,
    pub unit_price_cents: i64,
    pub total_cents: i64,
}

impl<'a> NewEstimate<'a> {
    pub fn new(estimate: &'a DomainNewEstimate, totals: &EstimateTotals) -> Self {
        Self {
            org_id: estimate.org_id.get(),
            claim_id: estimate.claim_id.get(),
            title: estimate.title.as_str(),
            status: "Draft",
            tax_rate: estimate.tax_rate.get(),
            subtotal_cents: totals.subtotal.get(),
            tax_cents: totals.tax.get(),
            total_cents: totals.total.get(),
        }
    }
}

impl<'a> NewEstimateItem<'a> {
    pub fn new(
        estimate_id: i32,
        item: &'a DomainNewEstimateItem,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            estimate_id,
            description: item.description.as_str(),
            quantity: item.quantity,
            unit: &item.unit,
            unit_price_cents: item.unit_price.get(),
            total_cents: item.line_total()?.get(),
        })
    }
}

impl TryFrom<EstimateItem> for DomainEstimateItem {
    type Error = TypeConstraintError;

    fn try_from(item: EstimateItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EstimateItemId::new(item.id)?,
            estimate_id: EstimateId::new(item.estimate_id)?,
            description: LineDescription::new(item.description)?,
            quantity: item.quantity,
            unit: item.unit,
            unit_price: Cents::new(item.unit_price_cents)?,
            total: Cents::new(item.total_cents)?,
        })
    }
}

/// Assembles a domain estimate from its row and item rows.
pub fn estimate_to_domain(
    estimate: Estimate,
    items: Vec<EstimateItem>,
) -> Result<DomainEstimate, TypeConstraintError> {
    let items = items
        .into_iter()
        .map(DomainEstimateItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DomainEstimate {
        id: EstimateId::new(estimate.id)?,
        org_id: OrgId::new(estimate.org_id)?,
        claim_id: ClaimId::new(estimate.claim_id)?,
        title: Title::new(estimate.title)?,
        status: estimate.status.parse()?,
        tax_rate: Rate::new(estimate.tax_rate)?,
        subtotal: Cents::new(estimate.subtotal_cents)?,
        tax: Cents::new(estimate.tax_cents)?,
        total: Cents::new(estimate.total_cents)?,
        items,
        created_at: estimate.created_at,
        updated_at: estimate.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertables_carry_computed_totals() {
        let item = DomainNewEstimateItem::new(
            LineDescription::new("Tear off").expect("desc"),
            30.0,
            "SQ",
            Cents::new(6_500).expect("price"),
        )
        .expect("item");
        let estimate = DomainNewEstimate {
            org_id: OrgId::new(1).expect("org"),
            claim_id: ClaimId::new(2).expect("claim"),
            title: Title::new("Roof replacement").expect("title"),
            tax_rate: Rate::new(0.1).expect("rate"),
            items: vec![item],
        };
        let totals = estimate.totals().expect("totals");

        let row = NewEstimate::new(&estimate, &totals);
        assert_eq!(row.subtotal_cents, 195_000);
        assert_eq!(row.tax_cents, 19_500);
        assert_eq!(row.total_cents, 214_500);
        assert_eq!(row.status, "Draft");

        let item_row = NewEstimateItem::new(9, &estimate.items[0]).expect("item row");
        assert_eq!(item_row.total_cents, 195_000);
    }
}
