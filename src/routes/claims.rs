use actix_web::{Responder, get, post, put, web};

use crate::auth::AuthenticatedUser;
use crate::forms::claims::{
    AddClaimEventForm, ChangeStatusForm, ClaimListParams, NewClaimForm, TimelineParams,
    UpdateClaimForm,
};
use crate::forms::members::AssignMembersForm;
use crate::integrations::mailer::ResendMailer;
use crate::repository::DieselRepository;
use crate::routes::{Dispatcher, created, respond};
use crate::services::{claims, members};

#[get("/claims")]
pub async fn list_claims(
    params: web::Query<ClaimListParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(claims::list_claims(repo.get_ref(), &user, params.into_inner()))
}

#[post("/claims")]
pub async fn create_claim(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    events: web::Data<Dispatcher>,
    form: web::Json<NewClaimForm>,
) -> impl Responder {
    created(claims::create_claim(
        repo.get_ref(),
        events.get_ref(),
        &user,
        form.into_inner(),
    ))
}

#[get("/claims/{claim_id}")]
pub async fn show_claim(
    claim_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(claims::get_claim(repo.get_ref(), &user, claim_id.into_inner()))
}

#[put("/claims/{claim_id}")]
pub async fn update_claim(
    claim_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    events: web::Data<Dispatcher>,
    form: web::Json<UpdateClaimForm>,
) -> impl Responder {
    respond(claims::update_claim(
        repo.get_ref(),
        events.get_ref(),
        &user,
        claim_id.into_inner(),
        form.into_inner(),
    ))
}

#[post("/claims/{claim_id}/status")]
pub async fn change_status(
    claim_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    events: web::Data<Dispatcher>,
    mailer: web::Data<ResendMailer>,
    form: web::Json<ChangeStatusForm>,
) -> impl Responder {
    respond(claims::change_status(
        repo.get_ref(),
        events.get_ref(),
        mailer.get_ref(),
        &user,
        claim_id.into_inner(),
        form.into_inner(),
    ))
}

#[get("/claims/{claim_id}/assignees")]
pub async fn list_assignees(
    claim_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(members::list_assignees(
        repo.get_ref(),
        &user,
        claim_id.into_inner(),
    ))
}

#[put("/claims/{claim_id}/assignees")]
pub async fn assign_members(
    claim_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    mailer: web::Data<ResendMailer>,
    form: web::Json<AssignMembersForm>,
) -> impl Responder {
    respond(members::assign_members(
        repo.get_ref(),
        mailer.get_ref(),
        &user,
        claim_id.into_inner(),
        form.into_inner(),
    ))
}

#[get("/claims/{claim_id}/events")]
pub async fn timeline(
    claim_id: web::Path<i32>,
    params: web::Query<TimelineParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(claims::timeline(
        repo.get_ref(),
        &user,
        claim_id.into_inner(),
        params.into_inner(),
    ))
}

#[post("/claims/{claim_id}/events")]
pub async fn add_event(
    claim_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddClaimEventForm>,
) -> impl Responder {
    created(claims::add_event(
        repo.get_ref(),
        &user,
        claim_id.into_inner(),
        form.into_inner(),
    ))
}
