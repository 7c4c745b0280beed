use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bazaar_api::{app, AppState};
use bazaar_catalog::HttpProductCatalog;
use bazaar_order::FulfillmentSettings;
use bazaar_store::app_config::{Config, LogFormat};
use bazaar_store::{DbClient, PgOrderRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_api=debug,bazaar_order=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;
    init_tracing(config.logging.format);
    tracing::info!("Starting order service on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to orders database")?;
    if config.database.run_migrations {
        db.migrate().await.context("Failed to run migrations")?;
    }

    let catalog = HttpProductCatalog::new(&config.catalog.base_url, config.catalog.timeout())
        .context("Failed to build products service client")?;

    let settings = FulfillmentSettings {
        compensation: config.fulfillment.compensation,
        remote_timeout: Duration::from_millis(config.fulfillment.remote_timeout_ms),
        transaction_timeout: Duration::from_millis(config.fulfillment.transaction_timeout_ms),
    };
    tracing::info!(compensation = ?settings.compensation, "Fulfillment settings loaded");

    let app_state = AppState::new(
        Arc::new(catalog),
        Arc::new(PgOrderRepository::new(db.pool.clone())),
        settings,
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
