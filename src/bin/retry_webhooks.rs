//! Re-sends failed webhook deliveries of webhooks that are still active.
//! Deliveries the receiver rejected with a permanent 4xx are not retried.
//!
//! Meant to run periodically (cron or a systemd timer). Each delivery keeps
//! its accumulated attempt count, and the usual failure accounting applies, so
//! a receiver that keeps failing is eventually disabled.

use std::env;

use config::Config;
use dotenvy::dotenv;

use stormdesk::db::establish_connection_pool;
use stormdesk::integrations::webhook::{ReqwestTransport, RetryPolicy, run_delivery};
use stormdesk::models::config::ServerConfig;
use stormdesk::repository::{DieselRepository, WebhookReader};

/// Deliveries picked up per run.
const BATCH_SIZE: i64 = 100;

#[actix_web::main]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = Config::builder()
        // Add `./config/default.yaml`
        .add_source(config::File::with_name("config/default"))
        // Add environment-specific overrides
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        // Add settings from the environment (with a prefix of APP)
        .add_source(config::Environment::with_prefix("APP"))
        .build();

    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Error loading settings: {err}");
            std::process::exit(1);
        }
    };

    let server_config = match settings.try_deserialize::<ServerConfig>() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let transport = match ReqwestTransport::new() {
        Ok(transport) => transport,
        Err(e) => {
            log::error!("Failed to create webhook transport: {e}");
            std::process::exit(1);
        }
    };
    let policy = RetryPolicy::from_config(&server_config);

    let pending = match repo.list_failed_deliveries(BATCH_SIZE) {
        Ok(pending) => pending,
        Err(e) => {
            log::error!("Failed to load failed deliveries: {e}");
            std::process::exit(1);
        }
    };

    if pending.is_empty() {
        log::info!("No failed webhook deliveries to retry");
        return;
    }

    let mut succeeded = 0;
    for (delivery, webhook) in &pending {
        let outcome = run_delivery(&repo, &transport, &policy, webhook, delivery).await;
        if outcome.succeeded {
            succeeded += 1;
        }
    }

    log::info!(
        "Retried {} webhook deliveries, {succeeded} succeeded",
        pending.len()
    );
}
