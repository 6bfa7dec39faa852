use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::db::DbConnection;
use crate::domain::claim::{Claim, ClaimStatus, NewClaim, UpdateClaim};
use crate::domain::types::{ClaimId, MemberEmail, OrgId, PropertyId};
use crate::models::claim::{Claim as DbClaim, NewClaim as DbNewClaim, UpdateClaim as DbUpdateClaim};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ClaimListQuery, ClaimReader, ClaimWriter, DieselRepository};
use crate::schema::{claim_assignments, claims, clients, members, properties};

fn filtered_claims(query: &ClaimListQuery) -> claims::BoxedQuery<'static, Sqlite> {
    let mut items = claims::table
        .filter(claims::org_id.eq(query.org_id.get()))
        .into_boxed();

    if let Some(status) = query.status {
        items = items.filter(claims::status.eq(status.as_str()));
    }

    if let Some(term) = query.search.as_deref() {
        let pattern = format!("%{}%", term.trim());
        items = items.filter(
            claims::claim_number
                .like(pattern.clone())
                .or(claims::carrier.like(pattern.clone()))
                .or(claims::policy_number.like(pattern.clone()))
                .or(claims::description.like(pattern)),
        );
    }

    if let Some(email) = &query.assigned_to {
        let member_ids = members::table
            .filter(members::email.eq(email.as_str().to_string()))
            .filter(members::org_id.eq(query.org_id.get()))
            .select(members::id);
        let claim_ids = claim_assignments::table
            .filter(claim_assignments::member_id.eq_any(member_ids))
            .select(claim_assignments::claim_id);
        items = items.filter(claims::id.eq_any(claim_ids));
    }

    items
}

/// Verifies the referenced client (and property, if any) belong to `org_id`.
fn check_claim_refs(
    conn: &mut DbConnection,
    org_id: OrgId,
    client_id: Option<i32>,
    property_id: Option<PropertyId>,
) -> RepositoryResult<()> {
    if let Some(client_id) = client_id {
        let owned: bool = diesel::select(diesel::dsl::exists(
            clients::table
                .filter(clients::id.eq(client_id))
                .filter(clients::org_id.eq(org_id.get())),
        ))
        .get_result(conn)?;
        if !owned {
            return Err(RepositoryError::NotFound);
        }
    }

    if let Some(property_id) = property_id {
        let owned: bool = diesel::select(diesel::dsl::exists(
            properties::table
                .filter(properties::id.eq(property_id.get()))
                .filter(properties::org_id.eq(org_id.get())),
        ))
        .get_result(conn)?;
        if !owned {
            return Err(RepositoryError::NotFound);
        }
    }

    Ok(())
}

impl ClaimReader for DieselRepository {
    fn get_claim_by_id(&self, id: ClaimId, org_id: OrgId) -> RepositoryResult<Option<Claim>> {
        let mut conn = self.conn()?;

        let claim = claims::table
            .filter(claims::id.eq(id.get()))
            .filter(claims::org_id.eq(org_id.get()))
            .select(DbClaim::as_select())
            .first::<DbClaim>(&mut conn)
            .optional()?;

        Ok(claim.map(Claim::try_from).transpose()?)
    }

    fn list_claims(&self, query: ClaimListQuery) -> RepositoryResult<(usize, Vec<Claim>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_claims(&query).count().get_result(&mut conn)?;

        let mut items = filtered_claims(&query).order(claims::updated_at.desc());
        if let Some(pagination) = &query.pagination {
            let (limit, offset) = pagination.limit_offset();
            items = items.limit(limit).offset(offset);
        }

        let rows = items.select(DbClaim::as_select()).load::<DbClaim>(&mut conn)?;

        let claims = rows
            .into_iter()
            .map(Claim::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, claims))
    }

    fn check_claim_assigned_to_member(
        &self,
        claim_id: ClaimId,
        org_id: OrgId,
        email: &MemberEmail,
    ) -> RepositoryResult<bool> {
        let mut conn = self.conn()?;

        let assigned: bool = diesel::select(diesel::dsl::exists(
            claim_assignments::table
                .inner_join(members::table)
                .filter(claim_assignments::claim_id.eq(claim_id.get()))
                .filter(members::email.eq(email.as_str()))
                .filter(members::org_id.eq(org_id.get())),
        ))
        .get_result(&mut conn)?;

        Ok(assigned)
    }
}

impl ClaimWriter for DieselRepository {
    fn create_claim(&self, claim: &NewClaim) -> RepositoryResult<Claim> {
        let mut conn = self.conn()?;

        conn.transaction::<Claim, RepositoryError, _>(|conn| {
            check_claim_refs(
                conn,
                claim.org_id,
                Some(claim.client_id.get()),
                claim.property_id,
            )?;

            let stored = diesel::insert_into(claims::table)
                .values(DbNewClaim::from(claim))
                .returning(DbClaim::as_returning())
                .get_result::<DbClaim>(conn)?;

            Ok(stored.try_into()?)
        })
    }

    fn update_claim(
        &self,
        id: ClaimId,
        org_id: OrgId,
        updates: &UpdateClaim,
    ) -> RepositoryResult<Claim> {
        let mut conn = self.conn()?;

        conn.transaction::<Claim, RepositoryError, _>(|conn| {
            check_claim_refs(conn, org_id, None, updates.property_id)?;

            let updated = diesel::update(
                claims::table
                    .filter(claims::id.eq(id.get()))
                    .filter(claims::org_id.eq(org_id.get())),
            )
            .set(DbUpdateClaim::from(updates))
            .returning(DbClaim::as_returning())
            .get_result::<DbClaim>(conn)?;

            Ok(updated.try_into()?)
        })
    }

    fn update_claim_status(
        &self,
        id: ClaimId,
        org_id: OrgId,
        status: ClaimStatus,
    ) -> RepositoryResult<Claim> {
        let mut conn = self.conn()?;

        let updated = diesel::update(
            claims::table
                .filter(claims::id.eq(id.get()))
                .filter(claims::org_id.eq(org_id.get())),
        )
        .set((
            claims::status.eq(status.as_str()),
            claims::updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .returning(DbClaim::as_returning())
        .get_result::<DbClaim>(&mut conn)?;

        Ok(updated.try_into()?)
    }
}
