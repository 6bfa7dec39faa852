use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::claim_event::{ClaimEvent, NewClaimEvent};
use crate::domain::member::Member;
use crate::domain::types::{ClaimEventId, OrgId};
use crate::models::claim_event::{ClaimEvent as DbClaimEvent, NewClaimEvent as DbNewClaimEvent};
use crate::models::member::Member as DbMember;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ClaimEventListQuery, ClaimEventReader, ClaimEventWriter, DieselRepository};
use crate::schema::{claim_events, claims, members};

impl ClaimEventReader for DieselRepository {
    fn list_claim_events(
        &self,
        query: ClaimEventListQuery,
    ) -> RepositoryResult<(usize, Vec<(ClaimEvent, Member)>)> {
        let mut conn = self.conn()?;

        let event_type = query.event_type.as_ref().map(ToString::to_string);

        let filtered = || {
            let mut items = claim_events::table
                .inner_join(claims::table)
                .inner_join(members::table)
                .filter(claim_events::claim_id.eq(query.claim_id.get()))
                .filter(claims::org_id.eq(query.org_id.get()))
                .into_boxed::<Sqlite>();
            if let Some(event_type) = event_type.clone() {
                items = items.filter(claim_events::event_type.eq(event_type));
            }
            items
        };

        let total: i64 = filtered().count().get_result(&mut conn)?;

        let mut items = filtered().order(claim_events::created_at.desc());
        if let Some(pagination) = &query.pagination {
            let (limit, offset) = pagination.limit_offset();
            items = items.limit(limit).offset(offset);
        }

        let rows = items
            .select((DbClaimEvent::as_select(), DbMember::as_select()))
            .load::<(DbClaimEvent, DbMember)>(&mut conn)?;

        let events = rows
            .into_iter()
            .map(|(event, member)| -> RepositoryResult<(ClaimEvent, Member)> {
                Ok((ClaimEvent::try_from(event)?, Member::try_from(member)?))
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok((total as usize, events))
    }

    fn get_claim_event(
        &self,
        id: ClaimEventId,
        org_id: OrgId,
    ) -> RepositoryResult<Option<ClaimEvent>> {
        let mut conn = self.conn()?;

        let event = claim_events::table
            .inner_join(claims::table)
            .filter(claim_events::id.eq(id.get()))
            .filter(claims::org_id.eq(org_id.get()))
            .select(DbClaimEvent::as_select())
            .first::<DbClaimEvent>(&mut conn)
            .optional()?;

        Ok(event.map(ClaimEvent::try_from).transpose()?)
    }
}

impl ClaimEventWriter for DieselRepository {
    fn create_claim_event(
        &self,
        event: &NewClaimEvent,
        org_id: OrgId,
    ) -> RepositoryResult<ClaimEvent> {
        let mut conn = self.conn()?;

        conn.transaction::<ClaimEvent, RepositoryError, _>(|conn| {
            let claim_owned: bool = diesel::select(diesel::dsl::exists(
                claims::table
                    .filter(claims::id.eq(event.claim_id.get()))
                    .filter(claims::org_id.eq(org_id.get())),
            ))
            .get_result(conn)?;
            let member_owned: bool = diesel::select(diesel::dsl::exists(
                members::table
                    .filter(members::id.eq(event.member_id.get()))
                    .filter(members::org_id.eq(org_id.get())),
            ))
            .get_result(conn)?;
            if !(claim_owned && member_owned) {
                return Err(RepositoryError::NotFound);
            }

            let stored = diesel::insert_into(claim_events::table)
                .values(DbNewClaimEvent::from(event))
                .returning(DbClaimEvent::as_returning())
                .get_result::<DbClaimEvent>(conn)?;

            Ok(stored.try_into()?)
        })
    }
}
