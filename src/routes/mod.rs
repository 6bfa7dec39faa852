//! JSON handlers. Each one extracts the caller and hands the request to the
//! matching service; this module turns service results into responses.

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, error, web};
use serde::Serialize;
use serde_json::json;

use crate::integrations::webhook::WebhookDispatcher;
use crate::repository::DieselRepository;
use crate::services::{ServiceError, ServiceResult};

pub mod auth;
pub mod billing;
pub mod claims;
pub mod clients;
pub mod compliance;
pub mod depreciation;
pub mod documents;
pub mod estimates;
pub mod health;
pub mod jobs;
pub mod leads;
pub mod members;
pub mod notifications;
pub mod organizations;
pub mod webhooks;

/// Event publisher registered as application data.
pub type Dispatcher = WebhookDispatcher<DieselRepository>;

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthorized => StatusCode::FORBIDDEN,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Form(_) | ServiceError::TypeConstraint(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::External(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Maps a service error to a JSON error body.
pub fn error_response(err: ServiceError) -> HttpResponse {
    let status = err.status_code();
    let message = match &err {
        ServiceError::Internal(details) => {
            log::error!("Internal error: {details}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    };
    HttpResponse::build(status).json(json!({ "error": message }))
}

/// `200 OK` with the value as JSON, or the mapped error.
pub fn respond<T: Serialize>(result: ServiceResult<T>) -> HttpResponse {
    respond_with(StatusCode::OK, result)
}

/// `201 Created` with the value as JSON, or the mapped error.
pub fn created<T: Serialize>(result: ServiceResult<T>) -> HttpResponse {
    respond_with(StatusCode::CREATED, result)
}

/// `204 No Content`, or the mapped error.
pub fn no_content(result: ServiceResult<()>) -> HttpResponse {
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}

fn respond_with<T: Serialize>(status: StatusCode, result: ServiceResult<T>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::build(status).json(value),
        Err(err) => error_response(err),
    }
}

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    let response = HttpResponse::BadRequest().json(json!({ "error": err.to_string() }));
    error::InternalError::from_response(err, response).into()
}

fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> error::Error {
    let response = HttpResponse::BadRequest().json(json!({ "error": err.to_string() }));
    error::InternalError::from_response(err, response).into()
}

/// Registers every API route under `/api/v1`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .service(organizations::show_organization)
            .service(organizations::show_branding)
            .service(organizations::save_branding)
            .service(members::list_members)
            .service(members::add_member)
            .service(members::me)
            .service(clients::import_clients)
            .service(clients::list_clients)
            .service(clients::create_client)
            .service(clients::show_client)
            .service(clients::update_client)
            .service(clients::delete_client)
            .service(clients::list_properties)
            .service(clients::create_property)
            .service(claims::list_claims)
            .service(claims::create_claim)
            .service(claims::show_claim)
            .service(claims::update_claim)
            .service(claims::change_status)
            .service(claims::list_assignees)
            .service(claims::assign_members)
            .service(claims::timeline)
            .service(claims::add_event)
            .service(estimates::list_estimates)
            .service(estimates::create_estimate)
            .service(estimates::show_estimate)
            .service(estimates::change_status)
            .service(depreciation::list_items)
            .service(depreciation::create_item)
            .service(depreciation::history)
            .service(depreciation::transition)
            .service(documents::generate)
            .service(compliance::claim_compliance)
            .service(compliance::state_compliance)
            .service(leads::list_leads)
            .service(leads::create_lead)
            .service(leads::show_lead)
            .service(leads::change_status)
            .service(leads::convert)
            .service(jobs::list_jobs)
            .service(jobs::create_job)
            .service(jobs::show_job)
            .service(jobs::change_status)
            .service(notifications::list_notifications)
            .service(notifications::read_all)
            .service(notifications::read_one)
            .service(webhooks::list_webhooks)
            .service(webhooks::create_webhook)
            .service(webhooks::delete_webhook)
            .service(webhooks::enable_webhook)
            .service(webhooks::test_webhook)
            .service(webhooks::list_deliveries),
    );
}

/// Registers the health check, session endpoints, Stripe endpoint and the API.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(
            web::scope("/auth")
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .service(auth::open_session)
                .service(auth::logout),
        )
        .service(billing::stripe_webhook)
        .configure(configure_api);
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    #[actix_web::test]
    async fn errors_map_to_status_and_json() {
        let cases = [
            (ServiceError::Unauthorized, StatusCode::FORBIDDEN),
            (ServiceError::NotFound, StatusCode::NOT_FOUND),
            (ServiceError::Form("bad".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Conflict("dup".into()), StatusCode::CONFLICT),
            (ServiceError::External("llm".into()), StatusCode::BAD_GATEWAY),
            (
                ServiceError::Unavailable("off".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ServiceError::Internal("db".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(error_response(err).status(), status);
        }
    }

    #[actix_web::test]
    async fn internal_details_are_not_leaked() {
        let response = error_response(ServiceError::Internal("disk I/O error".into()));
        let body = to_bytes(response.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "internal server error");
    }
}
