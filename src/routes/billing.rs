//! Inbound Stripe webhook.

use actix_web::{HttpRequest, HttpResponse, Responder, post, web};
use chrono::Utc;
use serde_json::json;

use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::billing::handle_stripe_event;

pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// The raw body is required: the signature covers the exact bytes Stripe sent.
#[post("/webhooks/stripe")]
pub async fn stripe_webhook(
    req: HttpRequest,
    body: web::Bytes,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let signature = req
        .headers()
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match handle_stripe_event(
        repo.get_ref(),
        &server_config.stripe_webhook_secret,
        &body,
        signature,
        Utc::now().timestamp(),
    ) {
        Ok(outcome) => HttpResponse::Ok().json(json!({ "received": true, "outcome": outcome })),
        Err(err) => error_response(err),
    }
}
