use actix_web::{Responder, get, post, web};

use crate::auth::AuthenticatedUser;
use crate::forms::leads::{LeadForm, LeadListParams, LeadStatusForm};
use crate::repository::DieselRepository;
use crate::routes::{Dispatcher, created, respond};
use crate::services::leads;

#[get("/leads")]
pub async fn list_leads(
    params: web::Query<LeadListParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(leads::list_leads(repo.get_ref(), &user, params.into_inner()))
}

#[post("/leads")]
pub async fn create_lead(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<LeadForm>,
) -> impl Responder {
    created(leads::create_lead(repo.get_ref(), &user, form.into_inner()))
}

#[get("/leads/{lead_id}")]
pub async fn show_lead(
    lead_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(leads::get_lead(repo.get_ref(), &user, lead_id.into_inner()))
}

#[post("/leads/{lead_id}/status")]
pub async fn change_status(
    lead_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<LeadStatusForm>,
) -> impl Responder {
    respond(leads::change_lead_status(
        repo.get_ref(),
        &user,
        lead_id.into_inner(),
        form.into_inner(),
    ))
}

#[post("/leads/{lead_id}/convert")]
pub async fn convert(
    lead_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    events: web::Data<Dispatcher>,
) -> impl Responder {
    created(leads::convert_lead(
        repo.get_ref(),
        events.get_ref(),
        &user,
        lead_id.into_inner(),
    ))
}
