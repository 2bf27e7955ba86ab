//! Backend entry-point: loads settings, picks a store and serves the REST API.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use userpost_api::domain::ports::DbRepository;
use userpost_api::outbound::memory::InMemoryRepository;
use userpost_api::outbound::persistence::{DbPool, DieselRepository, PoolConfig};
use userpost_api::settings::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let settings = AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    init_tracing(settings.is_production);

    let repository = build_repository(&settings).await?;
    let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, settings.port));
    let config = ServerConfig::new(bind_addr, repository)
        .with_dev_mode(settings.is_dev())
        .with_store_timeout(settings.store_timeout());

    create_server(config)
        .wrap_err_with(|| format!("failed to bind {bind_addr}"))?
        .await
        .wrap_err("server terminated with an error")
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let result = if json {
        fmt().with_env_filter(filter).json().try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

async fn build_repository(settings: &AppSettings) -> Result<Arc<dyn DbRepository>> {
    let Some(url) = settings.database_url.as_deref() else {
        info!("no database configured; using the in-memory store");
        return Ok(Arc::new(InMemoryRepository::new()));
    };

    let pool_config = PoolConfig::new(url)
        .with_max_size(settings.db_max_open)
        .with_min_idle(Some(settings.db_max_idle))
        .with_max_lifetime(Some(settings.db_max_lifetime()));
    let pool = DbPool::new(pool_config)
        .await
        .wrap_err("failed to create database pool")?;
    info!(
        max_open = settings.db_max_open,
        max_idle = settings.db_max_idle,
        "database pool ready"
    );
    Ok(Arc::new(DieselRepository::new(pool)))
}
