use actix_web::{Responder, get, web};

use crate::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::respond;
use crate::services::compliance;

#[get("/compliance/{state}")]
pub async fn state_compliance(state: web::Path<String>, user: AuthenticatedUser) -> impl Responder {
    respond(compliance::check_state(&user, &state))
}

#[get("/claims/{claim_id}/compliance")]
pub async fn claim_compliance(
    claim_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(compliance::check_claim(
        repo.get_ref(),
        &user,
        claim_id.into_inner(),
    ))
}
