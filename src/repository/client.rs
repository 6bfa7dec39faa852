use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::types::{ClientId, OrgId};
use crate::models::client::{
    Client as DbClient, NewClient as DbNewClient, UpdateClient as DbUpdateClient,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ClientListQuery, ClientReader, ClientWriter, DieselRepository};
use crate::schema::clients;

/// Builds the filtered (but not paginated) client query for `query`.
fn filtered_clients(query: &ClientListQuery) -> clients::BoxedQuery<'static, Sqlite> {
    let mut items = clients::table
        .filter(clients::org_id.eq(query.org_id.get()))
        .into_boxed();

    if let Some(term) = query.search.as_deref() {
        let pattern = format!("%{}%", term.trim());
        items = items.filter(
            clients::name
                .like(pattern.clone())
                .or(clients::email.like(pattern.clone()))
                .or(clients::phone.like(pattern.clone()))
                .or(clients::address.like(pattern)),
        );
    }

    items
}

impl ClientReader for DieselRepository {
    fn get_client_by_id(&self, id: ClientId, org_id: OrgId) -> RepositoryResult<Option<Client>> {
        let mut conn = self.conn()?;

        let client = clients::table
            .filter(clients::id.eq(id.get()))
            .filter(clients::org_id.eq(org_id.get()))
            .select(DbClient::as_select())
            .first::<DbClient>(&mut conn)
            .optional()?;

        Ok(client.map(Client::try_from).transpose()?)
    }

    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_clients(&query).count().get_result(&mut conn)?;

        let mut items = filtered_clients(&query).order(clients::name.asc());
        if let Some(pagination) = &query.pagination {
            let (limit, offset) = pagination.limit_offset();
            items = items.limit(limit).offset(offset);
        }

        let rows = items
            .select(DbClient::as_select())
            .load::<DbClient>(&mut conn)?;

        let clients = rows
            .into_iter()
            .map(Client::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, clients))
    }
}

impl ClientWriter for DieselRepository {
    fn create_client(&self, client: &NewClient) -> RepositoryResult<Client> {
        let mut conn = self.conn()?;

        let stored = diesel::insert_into(clients::table)
            .values(DbNewClient::from(client))
            .returning(DbClient::as_returning())
            .get_result::<DbClient>(&mut conn)?;

        Ok(stored.try_into()?)
    }

    fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize> {
        if new_clients.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let insertables: Vec<DbNewClient> = new_clients.iter().map(Into::into).collect();

        let affected = diesel::insert_into(clients::table)
            .values(&insertables)
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn update_client(
        &self,
        id: ClientId,
        org_id: OrgId,
        updates: &UpdateClient,
    ) -> RepositoryResult<Client> {
        let mut conn = self.conn()?;
        let db_updates = DbUpdateClient::from(updates);

        let updated = diesel::update(
            clients::table
                .filter(clients::id.eq(id.get()))
                .filter(clients::org_id.eq(org_id.get())),
        )
        .set(&db_updates)
        .returning(DbClient::as_returning())
        .get_result::<DbClient>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn delete_client(&self, id: ClientId, org_id: OrgId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            clients::table
                .filter(clients::id.eq(id.get()))
                .filter(clients::org_id.eq(org_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
