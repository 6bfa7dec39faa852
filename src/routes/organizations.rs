use actix_web::{Responder, get, put, web};

use crate::auth::AuthenticatedUser;
use crate::forms::organizations::BrandingForm;
use crate::repository::DieselRepository;
use crate::routes::respond;
use crate::services::organizations;

#[get("/org")]
pub async fn show_organization(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(organizations::get_organization(repo.get_ref(), &user))
}

#[get("/branding")]
pub async fn show_branding(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(organizations::get_branding(repo.get_ref(), &user))
}

#[put("/branding")]
pub async fn save_branding(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<BrandingForm>,
) -> impl Responder {
    respond(organizations::update_branding(
        repo.get_ref(),
        &user,
        form.into_inner(),
    ))
}
