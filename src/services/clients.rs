//! Homeowner clients and their properties.

use std::io::Read;

use crate::SERVICE_ACCESS_ROLE;
use crate::SERVICE_ADMIN_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::client::Client;
use crate::domain::property::Property;
use crate::domain::types::{ClientId, OrgId};
use crate::dto::clients::{ClientDetail, ImportSummary};
use crate::forms::clients::{ClientForm, ClientListParams, ClientPayload, parse_clients_csv};
use crate::forms::properties::{PropertyForm, PropertyPayload};
use crate::pagination::{Paginated, clamp_per_page};
use crate::repository::{
    ClientListQuery, ClientReader, ClientWriter, PropertyReader, PropertyWriter,
};
use crate::services::{ServiceError, ServiceResult};

pub fn list_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: ClientListParams,
) -> ServiceResult<Paginated<Client>>
where
    R: ClientReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let page = params.page.unwrap_or(1).max(1);
    let per_page = clamp_per_page(params.per_page);

    let mut query = ClientListQuery::new(org_id).paginate(page, per_page);
    if let Some(term) = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
    {
        query = query.search(term);
    }

    let (total, clients) = repo.list_clients(query).map_err(|err| {
        log::error!("Failed to list clients: {err}");
        err
    })?;

    Ok(Paginated::new(clients, page, per_page, total))
}

pub fn create_client<R>(repo: &R, user: &AuthenticatedUser, form: ClientForm) -> ServiceResult<Client>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = ClientPayload::try_from(form)?;
    let org_id = OrgId::new(user.org_id)?;

    Ok(repo.create_client(&payload.into_new(org_id))?)
}

/// Loads a client together with its properties.
pub fn get_client<R>(repo: &R, user: &AuthenticatedUser, client_id: i32) -> ServiceResult<ClientDetail>
where
    R: ClientReader + PropertyReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let client_id = ClientId::new(client_id)?;

    let client = repo
        .get_client_by_id(client_id, org_id)?
        .ok_or(ServiceError::NotFound)?;
    let properties = repo.list_properties(client_id, org_id)?;

    Ok(ClientDetail { client, properties })
}

pub fn update_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    form: ClientForm,
) -> ServiceResult<Client>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = ClientPayload::try_from(form)?;
    let org_id = OrgId::new(user.org_id)?;
    let client_id = ClientId::new(client_id)?;

    Ok(repo.update_client(client_id, org_id, &payload.into_update())?)
}

pub fn delete_client<R>(repo: &R, user: &AuthenticatedUser, client_id: i32) -> ServiceResult<()>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let client_id = ClientId::new(client_id)?;

    repo.delete_client(client_id, org_id).map_err(|err| {
        log::error!("Failed to delete client {client_id}: {err}");
        err
    })?;

    Ok(())
}

/// Parses a CSV upload and stores every row, or nothing when a row is invalid.
pub fn import_clients<R, C>(repo: &R, user: &AuthenticatedUser, csv: C) -> ServiceResult<ImportSummary>
where
    R: ClientWriter + ?Sized,
    C: Read,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;

    let clients = parse_clients_csv(csv, org_id).map_err(|err| {
        log::warn!("Rejected client import: {err}");
        err
    })?;
    if clients.is_empty() {
        return Ok(ImportSummary { imported: 0 });
    }

    let imported = repo.create_clients(&clients).map_err(|err| {
        log::error!("Failed to import clients: {err}");
        err
    })?;

    Ok(ImportSummary { imported })
}

pub fn create_property<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    form: PropertyForm,
) -> ServiceResult<Property>
where
    R: ClientReader + PropertyWriter + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let payload = PropertyPayload::try_from(form)?;
    let org_id = OrgId::new(user.org_id)?;
    let client_id = ClientId::new(client_id)?;

    if repo.get_client_by_id(client_id, org_id)?.is_none() {
        return Err(ServiceError::NotFound);
    }

    Ok(repo.create_property(&payload.into_domain(org_id, client_id))?)
}

pub fn list_properties<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
) -> ServiceResult<Vec<Property>>
where
    R: ClientReader + PropertyReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let org_id = OrgId::new(user.org_id)?;
    let client_id = ClientId::new(client_id)?;

    if repo.get_client_by_id(client_id, org_id)?.is_none() {
        return Err(ServiceError::NotFound);
    }

    Ok(repo.list_properties(client_id, org_id)?)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        ORG, admin_user, sample_client, sample_property, viewer_user,
    };

    fn client_form(name: &str) -> ClientForm {
        ClientForm {
            name: name.to_string(),
            email: Some("pat@example.com".to_string()),
            phone: None,
            address: None,
        }
    }

    #[test]
    fn list_clients_clamps_paging_and_trims_search() {
        let mut repo = MockRepository::new();
        repo.expect_list_clients()
            .withf(|query| {
                query.org_id.get() == ORG
                    && query.search.as_deref() == Some("elm")
                    && query.pagination.as_ref().map(|p| (p.page, p.per_page)) == Some((2, 100))
            })
            .times(1)
            .returning(|_| Ok((150, vec![sample_client(1)])));

        let page = list_clients(
            &repo,
            &viewer_user(),
            ClientListParams {
                search: Some("  elm ".to_string()),
                page: Some(2),
                per_page: Some(500),
            },
        )
        .unwrap();

        assert_eq!(page.total, 150);
        assert_eq!(page.per_page, 100);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn create_client_uses_callers_org() {
        let mut repo = MockRepository::new();
        repo.expect_create_client()
            .withf(|client| client.org_id.get() == ORG && client.name.as_str() == "Pat Homeowner")
            .times(1)
            .returning(|_| Ok(sample_client(3)));

        let client = create_client(&repo, &viewer_user(), client_form("Pat Homeowner")).unwrap();
        assert_eq!(client.id.get(), 3);
    }

    #[test]
    fn get_client_from_other_org_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .withf(|_, org_id| org_id.get() == ORG)
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_list_properties().times(0);

        let result = get_client(&repo, &viewer_user(), 12);
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn get_client_includes_properties() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .returning(|id, _| Ok(Some(sample_client(id.get()))));
        repo.expect_list_properties()
            .times(1)
            .returning(|client_id, _| Ok(vec![sample_property(1, client_id.get(), "TX")]));

        let detail = get_client(&repo, &viewer_user(), 5).unwrap();
        assert_eq!(detail.properties.len(), 1);
    }

    #[test]
    fn delete_client_requires_admin() {
        let mut repo = MockRepository::new();
        repo.expect_delete_client().times(0);

        let result = delete_client(&repo, &viewer_user(), 1);
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn import_clients_stores_all_rows() {
        let mut repo = MockRepository::new();
        repo.expect_create_clients()
            .withf(|clients| clients.len() == 2 && clients.iter().all(|c| c.org_id.get() == ORG))
            .times(1)
            .returning(|clients| Ok(clients.len()));

        let csv = "name,email,phone,address\nAlice,alice@example.com,,1 Oak St\nBob,,,\n";
        let summary = import_clients(&repo, &admin_user(), csv.as_bytes()).unwrap();
        assert_eq!(summary.imported, 2);
    }

    #[test]
    fn import_clients_rejects_invalid_file_without_writing() {
        let mut repo = MockRepository::new();
        repo.expect_create_clients().times(0);

        let csv = "name,email\nAlice,not-an-email\n";
        let result = import_clients(&repo, &admin_user(), csv.as_bytes());
        assert!(matches!(result, Err(ServiceError::Form(message)) if message.contains("line 2")));
    }

    #[test]
    fn create_property_checks_client_ownership() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id().returning(|_, _| Ok(None));
        repo.expect_create_property().times(0);

        let result = create_property(
            &repo,
            &viewer_user(),
            8,
            PropertyForm {
                address_line: "12 Elm St".into(),
                city: "Plano".into(),
                state: "tx".into(),
                postal_code: "75023".into(),
                latitude: None,
                longitude: None,
                roof_type: None,
            },
        );
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }
}
