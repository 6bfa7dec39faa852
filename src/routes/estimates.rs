use actix_web::{Responder, get, post, web};

use crate::auth::AuthenticatedUser;
use crate::forms::estimates::{EstimateForm, EstimateStatusForm};
use crate::repository::DieselRepository;
use crate::routes::{Dispatcher, created, respond};
use crate::services::estimates;

#[get("/claims/{claim_id}/estimates")]
pub async fn list_estimates(
    claim_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(estimates::list_estimates(
        repo.get_ref(),
        &user,
        claim_id.into_inner(),
    ))
}

#[post("/claims/{claim_id}/estimates")]
pub async fn create_estimate(
    claim_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    events: web::Data<Dispatcher>,
    form: web::Json<EstimateForm>,
) -> impl Responder {
    created(estimates::create_estimate(
        repo.get_ref(),
        events.get_ref(),
        &user,
        claim_id.into_inner(),
        form.into_inner(),
    ))
}

#[get("/estimates/{estimate_id}")]
pub async fn show_estimate(
    estimate_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(estimates::get_estimate(
        repo.get_ref(),
        &user,
        estimate_id.into_inner(),
    ))
}

#[post("/estimates/{estimate_id}/status")]
pub async fn change_status(
    estimate_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    events: web::Data<Dispatcher>,
    form: web::Json<EstimateStatusForm>,
) -> impl Responder {
    respond(estimates::change_estimate_status(
        repo.get_ref(),
        events.get_ref(),
        &user,
        estimate_id.into_inner(),
        form.into_inner(),
    ))
}
