#[cfg(feature = "server")]
use std::sync::Arc;

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};

#[cfg(feature = "server")]
use crate::db::establish_connection_pool;
#[cfg(feature = "server")]
use crate::integrations::ai_gateway::GatewayClient;
#[cfg(feature = "server")]
use crate::integrations::mailer::ResendMailer;
#[cfg(feature = "server")]
use crate::integrations::webhook::{ReqwestTransport, RetryPolicy, WebhookDispatcher};
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;

#[cfg(feature = "server")]
pub mod auth;
pub mod db;
pub mod domain;
pub mod dto;
mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod integrations;
pub mod models;
pub mod pagination;
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

pub const SERVICE_ACCESS_ROLE: &str = "claims";
pub const SERVICE_ADMIN_ROLE: &str = "claims_admin";
/// Members with this role (and without the admin role) only see claims assigned to them.
pub const SERVICE_MANAGER_ROLE: &str = "claims_manager";

/// Minimum length of the secret used to derive the session cookie key.
#[cfg(feature = "server")]
const MIN_SECRET_LEN: usize = 64;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);

    // Outbound webhooks are delivered on the actix runtime by the dispatcher.
    let transport = ReqwestTransport::new()
        .map_err(|e| std::io::Error::other(format!("Failed to start webhook transport: {e}")))?;
    let dispatcher = web::Data::new(WebhookDispatcher::new(
        repo.clone(),
        Arc::new(transport),
        RetryPolicy::from_config(&server_config),
    ));

    let mailer = ResendMailer::from_config(&server_config)
        .map_err(|e| std::io::Error::other(format!("Failed to start mailer: {e}")))?;
    let mailer = web::Data::new(mailer);

    let gateway = GatewayClient::from_config(&server_config)
        .map_err(|e| std::io::Error::other(format!("Failed to start AI gateway client: {e}")))?;
    if gateway.endpoint().is_none() {
        log::warn!("No AI gateway configured; document generation is disabled");
    }
    let gateway = web::Data::new(gateway);

    if server_config.secret.len() < MIN_SECRET_LEN {
        return Err(std::io::Error::other(format!(
            "`secret` must be at least {MIN_SECRET_LEN} bytes long"
        )));
    }
    let secret_key = Key::from(server_config.secret.as_bytes());

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!("Starting stormdesk on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
            .app_data(dispatcher.clone())
            .app_data(mailer.clone())
            .app_data(gateway.clone())
            .configure(routes::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
