use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::client::{Client, NewClient};
use crate::domain::lead::{Lead, LeadStatus, NewLead};
use crate::domain::types::{LeadId, OrgId};
use crate::models::client::{Client as DbClient, NewClient as DbNewClient};
use crate::models::lead::{Lead as DbLead, NewLead as DbNewLead};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, LeadListQuery, LeadReader, LeadWriter};
use crate::schema::{clients, leads};

fn filtered_leads(query: &LeadListQuery) -> leads::BoxedQuery<'static, Sqlite> {
    let mut items = leads::table
        .filter(leads::org_id.eq(query.org_id.get()))
        .into_boxed();

    if let Some(status) = query.status {
        items = items.filter(leads::status.eq(status.as_str()));
    }

    items
}

impl LeadReader for DieselRepository {
    fn get_lead_by_id(&self, id: LeadId, org_id: OrgId) -> RepositoryResult<Option<Lead>> {
        let mut conn = self.conn()?;

        let lead = leads::table
            .filter(leads::id.eq(id.get()))
            .filter(leads::org_id.eq(org_id.get()))
            .select(DbLead::as_select())
            .first::<DbLead>(&mut conn)
            .optional()?;

        Ok(lead.map(Lead::try_from).transpose()?)
    }

    fn list_leads(&self, query: LeadListQuery) -> RepositoryResult<(usize, Vec<Lead>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_leads(&query).count().get_result(&mut conn)?;

        let mut items = filtered_leads(&query).order(leads::created_at.desc());
        if let Some(pagination) = &query.pagination {
            let (limit, offset) = pagination.limit_offset();
            items = items.limit(limit).offset(offset);
        }

        let leads = items
            .select(DbLead::as_select())
            .load::<DbLead>(&mut conn)?
            .into_iter()
            .map(Lead::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, leads))
    }
}

impl LeadWriter for DieselRepository {
    fn create_lead(&self, lead: &NewLead) -> RepositoryResult<Lead> {
        let mut conn = self.conn()?;

        let stored = diesel::insert_into(leads::table)
            .values(DbNewLead::from(lead))
            .returning(DbLead::as_returning())
            .get_result::<DbLead>(&mut conn)?;

        Ok(stored.try_into()?)
    }

    fn update_lead_status(
        &self,
        id: LeadId,
        org_id: OrgId,
        status: LeadStatus,
    ) -> RepositoryResult<Lead> {
        let mut conn = self.conn()?;

        let updated = diesel::update(
            leads::table
                .filter(leads::id.eq(id.get()))
                .filter(leads::org_id.eq(org_id.get())),
        )
        .set((
            leads::status.eq(status.as_str()),
            leads::updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .returning(DbLead::as_returning())
        .get_result::<DbLead>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn convert_lead(
        &self,
        id: LeadId,
        org_id: OrgId,
        client: &NewClient,
    ) -> RepositoryResult<(Lead, Client)> {
        let mut conn = self.conn()?;

        conn.transaction::<(Lead, Client), RepositoryError, _>(|conn| {
            let current = leads::table
                .filter(leads::id.eq(id.get()))
                .filter(leads::org_id.eq(org_id.get()))
                .select(DbLead::as_select())
                .first::<DbLead>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            if current.status == LeadStatus::Converted.as_str() {
                return Err(RepositoryError::Conflict(
                    "lead is already converted".to_string(),
                ));
            }

            let stored_client = diesel::insert_into(clients::table)
                .values(DbNewClient::from(client))
                .returning(DbClient::as_returning())
                .get_result::<DbClient>(conn)?;

            let updated = diesel::update(leads::table.filter(leads::id.eq(current.id)))
                .set((
                    leads::status.eq(LeadStatus::Converted.as_str()),
                    leads::client_id.eq(Some(stored_client.id)),
                    leads::updated_at.eq(chrono::Utc::now().naive_utc()),
                ))
                .returning(DbLead::as_returning())
                .get_result::<DbLead>(conn)?;

            Ok((Lead::try_from(updated)?, Client::try_from(stored_client)?))
        })
    }
}
