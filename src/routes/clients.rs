use actix_multipart::form::MultipartForm;
use actix_web::{Responder, delete, get, post, put, web};

use crate::auth::AuthenticatedUser;
use crate::forms::clients::{ClientForm, ClientListParams, UploadClientsForm};
use crate::forms::properties::PropertyForm;
use crate::repository::DieselRepository;
use crate::routes::{created, no_content, respond};
use crate::services::{ServiceError, clients};

#[get("/clients")]
pub async fn list_clients(
    params: web::Query<ClientListParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(clients::list_clients(
        repo.get_ref(),
        &user,
        params.into_inner(),
    ))
}

#[post("/clients")]
pub async fn create_client(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<ClientForm>,
) -> impl Responder {
    created(clients::create_client(repo.get_ref(), &user, form.into_inner()))
}

/// Bulk import from a multipart `csv` field with a `name,email,phone,address` header.
#[post("/clients/import")]
pub async fn import_clients(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadClientsForm>,
) -> impl Responder {
    let result = form
        .reader()
        .map_err(ServiceError::from)
        .and_then(|file| clients::import_clients(repo.get_ref(), &user, file));
    respond(result)
}

#[get("/clients/{client_id}")]
pub async fn show_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(clients::get_client(
        repo.get_ref(),
        &user,
        client_id.into_inner(),
    ))
}

#[put("/clients/{client_id}")]
pub async fn update_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<ClientForm>,
) -> impl Responder {
    respond(clients::update_client(
        repo.get_ref(),
        &user,
        client_id.into_inner(),
        form.into_inner(),
    ))
}

#[delete("/clients/{client_id}")]
pub async fn delete_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    no_content(clients::delete_client(
        repo.get_ref(),
        &user,
        client_id.into_inner(),
    ))
}

#[get("/clients/{client_id}/properties")]
pub async fn list_properties(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(clients::list_properties(
        repo.get_ref(),
        &user,
        client_id.into_inner(),
    ))
}

#[post("/clients/{client_id}/properties")]
pub async fn create_property(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<PropertyForm>,
) -> impl Responder {
    created(clients::create_property(
        repo.get_ref(),
        &user,
        client_id.into_inner(),
        form.into_inner(),
    ))
}
