use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::property::{NewProperty as DomainNewProperty, Property as DomainProperty};
use crate::domain::types::{
    ClientId, NonEmptyString, OrgId, PropertyId, StateCode, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::properties)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Property {
    pub id: i32,
    pub org_id: i32,
    pub client_id: i32,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub roof_type: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::properties)]
pub struct NewProperty<'a> {
    pub org_id: i32,
    pub client_id: i32,
    pub address_line: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub postal_code: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub roof_type: Option<&'a str>,
}

impl TryFrom<Property> for DomainProperty {
    type Error = TypeConstraintError;

    fn try_from(property: Property) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PropertyId::new(property.id)?,
            org_id: OrgId::new(property.org_id)?,
            client_id: ClientId::new(property.client_id)?,
            address_line: NonEmptyString::new(property.address_line)?,
            city: NonEmptyString::new(property.city)?,
            state: StateCode::new(property.state)?,
            postal_code: NonEmptyString::new(property.postal_code)?,
            latitude: property.latitude,
            longitude: property.longitude,
            roof_type: property.roof_type,
            created_at: property.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewProperty> for NewProperty<'a> {
    fn from(property: &'a DomainNewProperty) -> Self {
        Self {
            org_id: property.org_id.get(),
            client_id: property.client_id.get(),
            address_line: property.address_line.as_str(),
            city: property.city.as_str(),
            state: property.state.as_str(),
            postal_code: property.postal_code.as_str(),
            latitude: property.latitude,
            longitude: property.longitude,
            roof_type: property.roof_type.as_deref(),
        }
    }
}
