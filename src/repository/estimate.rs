use diesel::prelude::*;

use crate::db::DbConnection;
use crate::domain::estimate::{Estimate, EstimateStatus, NewEstimate};
use crate::domain::types::{ClaimId, EstimateId, OrgId};
use crate::models::estimate::{
    Estimate as DbEstimate, EstimateItem as DbEstimateItem, NewEstimate as DbNewEstimate,
    NewEstimateItem as DbNewEstimateItem, estimate_to_domain,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, EstimateReader, EstimateWriter};
use crate::schema::{claims, estimate_items, estimates};

/// Loads the items of `estimate` and assembles the domain value.
fn load_estimate(conn: &mut DbConnection, estimate: DbEstimate) -> RepositoryResult<Estimate> {
    let items = DbEstimateItem::belonging_to(&estimate)
        .order(estimate_items::id.asc())
        .select(DbEstimateItem::as_select())
        .load::<DbEstimateItem>(conn)?;

    Ok(estimate_to_domain(estimate, items)?)
}

impl EstimateReader for DieselRepository {
    fn get_estimate_by_id(
        &self,
        id: EstimateId,
        org_id: OrgId,
    ) -> RepositoryResult<Option<Estimate>> {
        let mut conn = self.conn()?;

        let estimate = estimates::table
            .filter(estimates::id.eq(id.get()))
            .filter(estimates::org_id.eq(org_id.get()))
            .select(DbEstimate::as_select())
            .first::<DbEstimate>(&mut conn)
            .optional()?;

        estimate
            .map(|estimate| load_estimate(&mut conn, estimate))
            .transpose()
    }

    fn list_estimates(&self, claim_id: ClaimId, org_id: OrgId) -> RepositoryResult<Vec<Estimate>> {
        let mut conn = self.conn()?;

        let rows = estimates::table
            .filter(estimates::claim_id.eq(claim_id.get()))
            .filter(estimates::org_id.eq(org_id.get()))
            .order(estimates::created_at.desc())
            .select(DbEstimate::as_select())
            .load::<DbEstimate>(&mut conn)?;

        let items = DbEstimateItem::belonging_to(&rows)
            .order(estimate_items::id.asc())
            .select(DbEstimateItem::as_select())
            .load::<DbEstimateItem>(&mut conn)?
            .grouped_by(&rows);

        rows.into_iter()
            .zip(items)
            .map(|(estimate, items)| {
                estimate_to_domain(estimate, items).map_err(RepositoryError::from)
            })
            .collect()
    }
}

impl EstimateWriter for DieselRepository {
    fn create_estimate(&self, estimate: &NewEstimate) -> RepositoryResult<Estimate> {
        let mut conn = self.conn()?;
        let totals = estimate.totals()?;

        conn.transaction::<Estimate, RepositoryError, _>(|conn| {
            let claim_owned: bool = diesel::select(diesel::dsl::exists(
                claims::table
                    .filter(claims::id.eq(estimate.claim_id.get()))
                    .filter(claims::org_id.eq(estimate.org_id.get())),
            ))
            .get_result(conn)?;
            if !claim_owned {
                return Err(RepositoryError::NotFound);
            }

            let stored = diesel::insert_into(estimates::table)
                .values(DbNewEstimate::new(estimate, &totals))
                .returning(DbEstimate::as_returning())
                .get_result::<DbEstimate>(conn)?;

            if !estimate.items.is_empty() {
                let rows: Vec<DbNewEstimateItem> = estimate
                    .items
                    .iter()
                    .map(|item| DbNewEstimateItem::new(stored.id, item))
                    .collect::<Result<_, _>>()?;
                diesel::insert_into(estimate_items::table)
                    .values(&rows)
                    .execute(conn)?;
            }

            load_estimate(conn, stored)
        })
    }

    fn update_estimate_status(
        &self,
        id: EstimateId,
        org_id: OrgId,
        status: EstimateStatus,
    ) -> RepositoryResult<Estimate> {
        let mut conn = self.conn()?;

        conn.transaction::<Estimate, RepositoryError, _>(|conn| {
            let updated = diesel::update(
                estimates::table
                    .filter(estimates::id.eq(id.get()))
                    .filter(estimates::org_id.eq(org_id.get())),
            )
            .set((
                estimates::status.eq(status.as_str()),
                estimates::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .returning(DbEstimate::as_returning())
            .get_result::<DbEstimate>(conn)?;

            load_estimate(conn, updated)
        })
    }
}
