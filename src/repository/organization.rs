use diesel::prelude::*;

use crate::domain::organization::{
    Branding, NewOrganization, Organization, SubscriptionUpdate, UpdateBranding,
};
use crate::domain::types::OrgId;
use crate::models::organization::{
    Branding as DbBranding, NewOrganization as DbNewOrganization, Organization as DbOrganization,
    SubscriptionChangeset, UpsertBranding,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, OrganizationReader, OrganizationWriter};
use crate::schema::{branding, organizations};

impl OrganizationReader for DieselRepository {
    fn get_organization(&self, org_id: OrgId) -> RepositoryResult<Option<Organization>> {
        let mut conn = self.conn()?;

        let org = organizations::table
            .filter(organizations::id.eq(org_id.get()))
            .select(DbOrganization::as_select())
            .first::<DbOrganization>(&mut conn)
            .optional()?;

        Ok(org.map(Organization::try_from).transpose()?)
    }

    fn get_organization_by_customer(
        &self,
        stripe_customer_id: &str,
    ) -> RepositoryResult<Option<Organization>> {
        let mut conn = self.conn()?;

        let org = organizations::table
            .filter(organizations::stripe_customer_id.eq(stripe_customer_id))
            .select(DbOrganization::as_select())
            .first::<DbOrganization>(&mut conn)
            .optional()?;

        Ok(org.map(Organization::try_from).transpose()?)
    }

    fn get_branding(&self, org_id: OrgId) -> RepositoryResult<Option<Branding>> {
        let mut conn = self.conn()?;

        let row = branding::table
            .filter(branding::org_id.eq(org_id.get()))
            .select(DbBranding::as_select())
            .first::<DbBranding>(&mut conn)
            .optional()?;

        Ok(row.map(Branding::try_from).transpose()?)
    }
}

impl OrganizationWriter for DieselRepository {
    fn ensure_organization(&self, org: &NewOrganization) -> RepositoryResult<Organization> {
        let mut conn = self.conn()?;
        let insertable = DbNewOrganization::from(org);

        diesel::insert_or_ignore_into(organizations::table)
            .values(&insertable)
            .execute(&mut conn)?;

        let stored = organizations::table
            .filter(organizations::id.eq(org.id.get()))
            .select(DbOrganization::as_select())
            .first::<DbOrganization>(&mut conn)?;

        Ok(stored.try_into()?)
    }

    fn update_subscription(
        &self,
        org_id: OrgId,
        update: &SubscriptionUpdate,
    ) -> RepositoryResult<Organization> {
        let mut conn = self.conn()?;
        let changeset = SubscriptionChangeset::from(update);

        let updated = diesel::update(organizations::table.filter(organizations::id.eq(org_id.get())))
            .set(&changeset)
            .returning(DbOrganization::as_returning())
            .get_result::<DbOrganization>(&mut conn)?;

        Ok(updated.try_into()?)
    }

    fn upsert_branding(
        &self,
        org_id: OrgId,
        branding_update: &UpdateBranding,
    ) -> RepositoryResult<Branding> {
        let mut conn = self.conn()?;
        let row = UpsertBranding::new(org_id, branding_update);

        let stored = diesel::insert_into(branding::table)
            .values(&row)
            .on_conflict(branding::org_id)
            .do_update()
            .set(&row)
            .returning(DbBranding::as_returning())
            .get_result::<DbBranding>(&mut conn)?;

        Ok(stored.try_into()?)
    }
}
