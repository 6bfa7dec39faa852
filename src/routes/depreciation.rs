use actix_web::{Responder, get, post, web};

use crate::auth::AuthenticatedUser;
use crate::forms::depreciation::{DepreciationItemForm, DepreciationTransitionForm};
use crate::repository::DieselRepository;
use crate::routes::{Dispatcher, created, respond};
use crate::services::depreciation;

#[get("/claims/{claim_id}/depreciation")]
pub async fn list_items(
    claim_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(depreciation::list_items(
        repo.get_ref(),
        &user,
        claim_id.into_inner(),
    ))
}

#[post("/claims/{claim_id}/depreciation")]
pub async fn create_item(
    claim_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<DepreciationItemForm>,
) -> impl Responder {
    created(depreciation::create_item(
        repo.get_ref(),
        &user,
        claim_id.into_inner(),
        form.into_inner(),
    ))
}

#[get("/depreciation/{item_id}")]
pub async fn history(
    item_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(depreciation::item_history(
        repo.get_ref(),
        &user,
        item_id.into_inner(),
    ))
}

#[post("/depreciation/{item_id}/status")]
pub async fn transition(
    item_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    events: web::Data<Dispatcher>,
    form: web::Json<DepreciationTransitionForm>,
) -> impl Responder {
    respond(depreciation::transition_item(
        repo.get_ref(),
        events.get_ref(),
        &user,
        item_id.into_inner(),
        form.into_inner(),
    ))
}
