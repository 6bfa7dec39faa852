use diesel::prelude::*;

use crate::domain::member::{Member, NewMember};
use crate::domain::types::{ClaimId, MemberEmail, MemberId, OrgId};
use crate::models::member::{ClaimAssignment, Member as DbMember, NewMember as DbNewMember};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, MemberReader, MemberWriter};
use crate::schema::{claim_assignments, claims, members};

impl MemberReader for DieselRepository {
    fn get_member_by_id(&self, id: MemberId, org_id: OrgId) -> RepositoryResult<Option<Member>> {
        let mut conn = self.conn()?;

        let member = members::table
            .filter(members::id.eq(id.get()))
            .filter(members::org_id.eq(org_id.get()))
            .select(DbMember::as_select())
            .first::<DbMember>(&mut conn)
            .optional()?;

        Ok(member.map(Member::try_from).transpose()?)
    }

    fn get_member_by_email(
        &self,
        email: &MemberEmail,
        org_id: OrgId,
    ) -> RepositoryResult<Option<Member>> {
        let mut conn = self.conn()?;

        let member = members::table
            .filter(members::email.eq(email.as_str()))
            .filter(members::org_id.eq(org_id.get()))
            .select(DbMember::as_select())
            .first::<DbMember>(&mut conn)
            .optional()?;

        Ok(member.map(Member::try_from).transpose()?)
    }

    fn list_members(&self, org_id: OrgId) -> RepositoryResult<Vec<Member>> {
        let mut conn = self.conn()?;

        let rows = members::table
            .filter(members::org_id.eq(org_id.get()))
            .order(members::name.asc())
            .select(DbMember::as_select())
            .load::<DbMember>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(Member::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn list_claim_assignees(
        &self,
        claim_id: ClaimId,
        org_id: OrgId,
    ) -> RepositoryResult<Vec<Member>> {
        let mut conn = self.conn()?;

        let rows = members::table
            .inner_join(claim_assignments::table)
            .filter(claim_assignments::claim_id.eq(claim_id.get()))
            .filter(members::org_id.eq(org_id.get()))
            .order(members::name.asc())
            .select(DbMember::as_select())
            .load::<DbMember>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(Member::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl MemberWriter for DieselRepository {
    fn create_or_update_member(&self, member: &NewMember) -> RepositoryResult<Member> {
        let mut conn = self.conn()?;
        let insertable = DbNewMember::from(member);

        let stored = diesel::insert_into(members::table)
            .values(&insertable)
            .on_conflict((members::org_id, members::email))
            .do_update()
            .set((
                members::name.eq(insertable.name),
                members::is_user.eq(insertable.is_user),
            ))
            .returning(DbMember::as_returning())
            .get_result::<DbMember>(&mut conn)?;

        Ok(stored.try_into()?)
    }

    fn assign_members_to_claim(
        &self,
        claim_id: ClaimId,
        org_id: OrgId,
        member_ids: &[MemberId],
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            let claim_exists: bool = diesel::select(diesel::dsl::exists(
                claims::table
                    .filter(claims::id.eq(claim_id.get()))
                    .filter(claims::org_id.eq(org_id.get())),
            ))
            .get_result(conn)?;
            if !claim_exists {
                return Err(RepositoryError::NotFound);
            }

            let raw_ids: Vec<i32> = member_ids.iter().map(|id| id.get()).collect();
            let valid_ids: Vec<i32> = members::table
                .filter(members::id.eq_any(&raw_ids))
                .filter(members::org_id.eq(org_id.get()))
                .select(members::id)
                .load(conn)?;
            if valid_ids.len() != raw_ids.len() {
                return Err(RepositoryError::ValidationError(
                    "unknown member in assignment".to_string(),
                ));
            }

            diesel::delete(
                claim_assignments::table.filter(claim_assignments::claim_id.eq(claim_id.get())),
            )
            .execute(conn)?;

            if valid_ids.is_empty() {
                return Ok(0);
            }

            let rows: Vec<ClaimAssignment> = valid_ids
                .into_iter()
                .map(|member_id| ClaimAssignment {
                    claim_id: claim_id.get(),
                    member_id,
                })
                .collect();

            let inserted = diesel::insert_into(claim_assignments::table)
                .values(&rows)
                .execute(conn)?;

            Ok(inserted)
        })
    }
}
