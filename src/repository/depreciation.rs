use diesel::prelude::*;

use crate::domain::depreciation::{
    DepreciationEvent, DepreciationItem, DepreciationStatus, NewDepreciationItem,
};
use crate::domain::types::{ClaimId, DepreciationItemId, OrgId};
use crate::models::depreciation::{
    DepreciationEvent as DbDepreciationEvent, DepreciationItem as DbDepreciationItem,
    NewDepreciationEvent as DbNewDepreciationEvent, NewDepreciationItem as DbNewDepreciationItem,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DepreciationReader, DepreciationWriter, DieselRepository};
use crate::schema::{claims, depreciation_events, depreciation_items};

impl DepreciationReader for DieselRepository {
    fn get_depreciation_item(
        &self,
        id: DepreciationItemId,
        org_id: OrgId,
    ) -> RepositoryResult<Option<DepreciationItem>> {
        let mut conn = self.conn()?;

        let item = depreciation_items::table
            .filter(depreciation_items::id.eq(id.get()))
            .filter(depreciation_items::org_id.eq(org_id.get()))
            .select(DbDepreciationItem::as_select())
            .first::<DbDepreciationItem>(&mut conn)
            .optional()?;

        Ok(item.map(DepreciationItem::try_from).transpose()?)
    }

    fn list_depreciation_items(
        &self,
        claim_id: ClaimId,
        org_id: OrgId,
    ) -> RepositoryResult<Vec<DepreciationItem>> {
        let mut conn = self.conn()?;

        let rows = depreciation_items::table
            .filter(depreciation_items::claim_id.eq(claim_id.get()))
            .filter(depreciation_items::org_id.eq(org_id.get()))
            .order(depreciation_items::id.asc())
            .select(DbDepreciationItem::as_select())
            .load::<DbDepreciationItem>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(DepreciationItem::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn list_depreciation_events(
        &self,
        item_id: DepreciationItemId,
        org_id: OrgId,
    ) -> RepositoryResult<Vec<DepreciationEvent>> {
        let mut conn = self.conn()?;

        let rows = depreciation_events::table
            .inner_join(depreciation_items::table)
            .filter(depreciation_events::item_id.eq(item_id.get()))
            .filter(depreciation_items::org_id.eq(org_id.get()))
            .order(depreciation_events::id.asc())
            .select(DbDepreciationEvent::as_select())
            .load::<DbDepreciationEvent>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(DepreciationEvent::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl DepreciationWriter for DieselRepository {
    fn create_depreciation_item(
        &self,
        item: &NewDepreciationItem,
    ) -> RepositoryResult<DepreciationItem> {
        let mut conn = self.conn()?;

        conn.transaction::<DepreciationItem, RepositoryError, _>(|conn| {
            let claim_owned: bool = diesel::select(diesel::dsl::exists(
                claims::table
                    .filter(claims::id.eq(item.claim_id.get()))
                    .filter(claims::org_id.eq(item.org_id.get())),
            ))
            .get_result(conn)?;
            if !claim_owned {
                return Err(RepositoryError::NotFound);
            }

            let stored = diesel::insert_into(depreciation_items::table)
                .values(DbNewDepreciationItem::from(item))
                .returning(DbDepreciationItem::as_returning())
                .get_result::<DbDepreciationItem>(conn)?;

            diesel::insert_into(depreciation_events::table)
                .values(DbNewDepreciationEvent {
                    item_id: stored.id,
                    from_status: None,
                    to_status: DepreciationStatus::Calculated.as_str(),
                    note: None,
                })
                .execute(conn)?;

            Ok(stored.try_into()?)
        })
    }

    fn transition_depreciation_item(
        &self,
        id: DepreciationItemId,
        org_id: OrgId,
        from: DepreciationStatus,
        to: DepreciationStatus,
        note: Option<String>,
    ) -> RepositoryResult<DepreciationItem> {
        let mut conn = self.conn()?;

        conn.transaction::<DepreciationItem, RepositoryError, _>(|conn| {
            // Guarded on the expected status so concurrent transitions cannot both win.
            let updated = diesel::update(
                depreciation_items::table
                    .filter(depreciation_items::id.eq(id.get()))
                    .filter(depreciation_items::org_id.eq(org_id.get()))
                    .filter(depreciation_items::status.eq(from.as_str())),
            )
            .set((
                depreciation_items::status.eq(to.as_str()),
                depreciation_items::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .returning(DbDepreciationItem::as_returning())
            .get_result::<DbDepreciationItem>(conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

            diesel::insert_into(depreciation_events::table)
                .values(DbNewDepreciationEvent {
                    item_id: updated.id,
                    from_status: Some(from.as_str()),
                    to_status: to.as_str(),
                    note: note.as_deref(),
                })
                .execute(conn)?;

            Ok(updated.try_into()?)
        })
    }
}
