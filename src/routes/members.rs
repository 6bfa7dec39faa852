use actix_web::{Responder, get, post, web};

use crate::SERVICE_ACCESS_ROLE;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::forms::members::AddMemberForm;
use crate::repository::DieselRepository;
use crate::routes::{created, respond};
use crate::services::members;

#[get("/members")]
pub async fn list_members(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(members::list_members(repo.get_ref(), &user))
}

#[post("/members")]
pub async fn add_member(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddMemberForm>,
) -> impl Responder {
    created(members::add_member(repo.get_ref(), &user, form.into_inner()))
}

/// The caller's own member record, created on first use.
#[get("/members/me")]
pub async fn me(user: AuthenticatedUser, repo: web::Data<DieselRepository>) -> impl Responder {
    respond(
        ensure_role(&user, SERVICE_ACCESS_ROLE)
            .and_then(|()| members::current_member(repo.get_ref(), &user)),
    )
}
