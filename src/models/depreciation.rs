//! Diesel models for depreciation items and their status log.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::depreciation::{
    AgeYears, DepreciationEvent as DomainDepreciationEvent,
    DepreciationItem as DomainDepreciationItem, DepreciationStatus,
    NewDepreciationItem as DomainNewDepreciationItem,
};
use crate::domain::types::{
    Cents, ClaimId, DepreciationEventId, DepreciationItemId, LineDescription, OrgId, Rate,
    TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::depreciation_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DepreciationItem {
    pub id: i32,
    pub org_id: i32,
    pub claim_id: i32,
    pub description: String,
    pub original_value_cents: i64,
    pub annual_rate: f64,
    pub age_years: f64,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::depreciation_items)]
pub struct NewDepreciationItem<'a> {
    pub org_id: i32,
    pub claim_id: i32,
    pub description: &'a str,
    pub original_value_cents: i64,
    pub annual_rate: f64,
    pub age_years: f64,
    pub status: &'a str,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(DepreciationItem, foreign_key = item_id))]
#[diesel(table_name = crate::schema::depreciation_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DepreciationEvent {
    pub id: i32,
    pub item_id: i32,
    pub from_status: Option<String>,
    pub to_status: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::depreciation_events)]
pub struct NewDepreciationEvent<'a> {
    pub item_id: i32,
    pub from_status: Option<&'a str>,
    pub to_status: &'a str,
    pub note: Option<&'a str>,
}

impl TryFrom<DepreciationItem> for DomainDepreciationItem {
    type Error = TypeConstraintError;

    fn try_from(row: DepreciationItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DepreciationItemId::new(row.id)?,
            org_id: OrgId::new(row.org_id)?,
            claim_id: ClaimId::new(row.claim_id)?,
            description: LineDescription::new(row.description)?,
            original_value: Cents::new(row.original_value_cents)?,
            annual_rate: Rate::new(row.annual_rate)?,
            age: AgeYears::new(row.age_years)?,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewDepreciationItem> for NewDepreciationItem<'a> {
    fn from(item: &'a DomainNewDepreciationItem) -> Self {
        Self {
            org_id: item.org_id.get(),
            claim_id: item.claim_id.get(),
            description: item.description.as_str(),
            original_value_cents: item.original_value.get(),
            annual_rate: item.annual_rate.get(),
            age_years: item.age.get(),
            status: DepreciationStatus::Calculated.as_str(),
        }
    }
}

impl TryFrom<DepreciationEvent> for DomainDepreciationEvent {
    type Error = TypeConstraintError;

    fn try_from(row: DepreciationEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DepreciationEventId::new(row.id)?,
            item_id: DepreciationItemId::new(row.item_id)?,
            from_status: row
                .from_status
                .as_deref()
                .map(str::parse::<DepreciationStatus>)
                .transpose()?,
            to_status: row.to_status.parse()?,
            note: row.note,
            created_at: row.created_at,
        })
    }
}
