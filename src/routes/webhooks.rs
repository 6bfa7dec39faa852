use actix_web::{HttpResponse, Responder, delete, get, post, web};

use crate::auth::AuthenticatedUser;
use crate::forms::webhooks::WebhookForm;
use crate::repository::DieselRepository;
use crate::routes::{Dispatcher, created, error_response, no_content, respond};
use crate::services::webhooks;

#[get("/webhooks")]
pub async fn list_webhooks(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(webhooks::list_webhooks(repo.get_ref(), &user))
}

/// The response is the only place the signing secret is ever shown.
#[post("/webhooks")]
pub async fn create_webhook(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<WebhookForm>,
) -> impl Responder {
    created(webhooks::create_webhook(
        repo.get_ref(),
        &user,
        form.into_inner(),
    ))
}

#[delete("/webhooks/{webhook_id}")]
pub async fn delete_webhook(
    webhook_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    no_content(webhooks::delete_webhook(
        repo.get_ref(),
        &user,
        webhook_id.into_inner(),
    ))
}

#[post("/webhooks/{webhook_id}/enable")]
pub async fn enable_webhook(
    webhook_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(webhooks::enable_webhook(
        repo.get_ref(),
        &user,
        webhook_id.into_inner(),
    ))
}

#[post("/webhooks/{webhook_id}/test")]
pub async fn test_webhook(
    webhook_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    events: web::Data<Dispatcher>,
) -> impl Responder {
    match webhooks::send_test_event(
        repo.get_ref(),
        events.get_ref(),
        &user,
        webhook_id.into_inner(),
    ) {
        Ok(()) => HttpResponse::Accepted().finish(),
        Err(err) => error_response(err),
    }
}

#[get("/webhooks/{webhook_id}/deliveries")]
pub async fn list_deliveries(
    webhook_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    respond(webhooks::list_deliveries(
        repo.get_ref(),
        &user,
        webhook_id.into_inner(),
    ))
}
