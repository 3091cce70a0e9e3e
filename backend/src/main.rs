//! Backend entry-point: loads configuration, prepares persistence and serves
//! the REST API with its OpenAPI docs.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use wishlist_backend::inbound::http::health::HealthState;
use wishlist_backend::outbound::persistence::{DbPool, run_pending_migrations};
use wishlist_backend::settings::WishlistSettings;

use server::{CredentialConfig, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        WishlistSettings::load().map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let bind_addr = settings.bind_addr()?;

    if settings.uses_default_jwt_secret() {
        warn!("signing access tokens with the default secret; set WISHLIST_JWT_SECRET");
    }

    let credentials = CredentialConfig::new(settings.jwt_secret(), settings.jwt_lifetime())
        .with_hash_costs(settings.hash_memory_kib(), settings.hash_time_cost());
    let mut config = ServerConfig::new(bind_addr, credentials)
        .with_retry_policy(settings.retry_policy())
        .with_cors(settings.cors_policy());

    if let Some(pool_config) = settings.pool_config() {
        run_pending_migrations(pool_config.database_url())
            .await
            .wrap_err("failed to migrate database")?;
        let pool = DbPool::new(pool_config)
            .await
            .wrap_err("failed to create database pool")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let draining = health_state.clone();
    actix_web::rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            draining.mark_unhealthy();
            info!("shutdown requested, failing liveness while draining");
        }
    });
    let server = create_server(health_state, config).wrap_err("failed to start server")?;
    info!(%bind_addr, "listening");
    server.await.wrap_err("server terminated unexpectedly")
}
