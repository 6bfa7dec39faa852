use diesel::prelude::*;

use crate::domain::property::{NewProperty, Property};
use crate::domain::types::{ClientId, OrgId, PropertyId};
use crate::models::property::{NewProperty as DbNewProperty, Property as DbProperty};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, PropertyReader, PropertyWriter};
use crate::schema::{clients, properties};

impl PropertyReader for DieselRepository {
    fn get_property_by_id(
        &self,
        id: PropertyId,
        org_id: OrgId,
    ) -> RepositoryResult<Option<Property>> {
        let mut conn = self.conn()?;

        let row = properties::table
            .filter(properties::id.eq(id.get()))
            .filter(properties::org_id.eq(org_id.get()))
            .select(DbProperty::as_select())
            .first::<DbProperty>(&mut conn)
            .optional()?;

        Ok(row.map(Property::try_from).transpose()?)
    }

    fn list_properties(
        &self,
        client_id: ClientId,
        org_id: OrgId,
    ) -> RepositoryResult<Vec<Property>> {
        let mut conn = self.conn()?;

        let rows = properties::table
            .filter(properties::client_id.eq(client_id.get()))
            .filter(properties::org_id.eq(org_id.get()))
            .order(properties::id.asc())
            .select(DbProperty::as_select())
            .load::<DbProperty>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(Property::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl PropertyWriter for DieselRepository {
    fn create_property(&self, property: &NewProperty) -> RepositoryResult<Property> {
        let mut conn = self.conn()?;

        conn.transaction::<Property, RepositoryError, _>(|conn| {
            // The owning client must belong to the same organization.
            let owned: bool = diesel::select(diesel::dsl::exists(
                clients::table
                    .filter(clients::id.eq(property.client_id.get()))
                    .filter(clients::org_id.eq(property.org_id.get())),
            ))
            .get_result(conn)?;
            if !owned {
                return Err(RepositoryError::NotFound);
            }

            let stored = diesel::insert_into(properties::table)
                .values(DbNewProperty::from(property))
                .returning(DbProperty::as_returning())
                .get_result::<DbProperty>(conn)?;

            Ok(stored.try_into()?)
        })
    }
}
