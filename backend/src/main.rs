//! Backend entry-point: loads settings, prepares the account store and
//! serves the registration API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServerSettings, create_server};
use signup::inbound::http::health::HealthState;
use signup::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

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

    let settings = ServerSettings::load().wrap_err("failed to load settings")?;
    let mut config = ServerConfig::new(
        settings.bind_addr()?,
        settings.avatar_dir(),
        settings.public_base_url()?,
    );

    if let Some(database_url) = settings.database_url() {
        let url = database_url.to_owned();
        let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&url))
            .await
            .wrap_err("migration task panicked")?
            .wrap_err("failed to apply migrations")?;
        info!(applied, "database schema is up to date");

        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(settings.pool_max_size()?),
        )
        .await
        .wrap_err("failed to build database pool")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("failed to start server")?;
    info!(bind_addr = ?settings.bind_addr()?, "listening");
    server.await.wrap_err("server terminated")?;
    Ok(())
}
