//! Backend entry-point: loads settings, prepares the stores and serves the
//! session views, the token endpoint and the user API.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use rest_auth::inbound::http::health::HealthState;
use rest_auth::inbound::http::session_config::fingerprint::key_fingerprint;
use rest_auth::inbound::http::session_config::{BuildMode, session_settings_from_env};
use rest_auth::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use rest_auth::settings::AppSettings;
use server::{ServerConfig, create_server, drain_on_interrupt};

fn other(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(err.to_string())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(other)?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let bind_addr = settings.bind_addr().map_err(other)?;
    let mut config = ServerConfig::new(session, bind_addr, settings.auth_view_config())
        .with_bcrypt_cost(settings.bcrypt_cost())
        .with_admin(settings.admin_account().map_err(other)?);

    if let Some(url) = settings.database_url() {
        run_pending_migrations(url).await.map_err(other)?;
        let pool = DbPool::new(PoolConfig::new(url)).await.map_err(other)?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).await?;
    drain_on_interrupt(health_state);
    info!(%bind_addr, "listening");
    server.await
}
