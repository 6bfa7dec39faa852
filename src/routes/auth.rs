//! Session cookie endpoints.

use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, post, web};

use crate::forms::organizations::SessionForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::organizations::start_session;

/// Validates the identity provider token, provisions the tenant and member,
/// and keeps the token in the identity cookie.
#[post("/session")]
pub async fn open_session(
    req: HttpRequest,
    form: web::Json<SessionForm>,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let form = form.into_inner();
    let token = form.token.clone();

    let (user, session) = match start_session(repo.get_ref(), &server_config.secret, form) {
        Ok(result) => result,
        Err(err) => return error_response(err),
    };

    if let Err(err) = Identity::login(&req.extensions(), token) {
        log::error!("Failed to store session for {}: {err}", user.email);
        return HttpResponse::InternalServerError().finish();
    }

    log::info!("Session opened for {} in org {}", user.email, user.org_id);
    HttpResponse::Ok().json(session)
}

#[post("/logout")]
pub async fn logout(identity: Option<Identity>) -> impl Responder {
    if let Some(identity) = identity {
        identity.logout();
    }
    HttpResponse::NoContent().finish()
}
