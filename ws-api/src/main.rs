use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use ws_api::{create_app, AppState, Config};
use ws_orchestrator::db::{backup_database, create_pool, run_migrations};
use ws_orchestrator::HttpProvisioner;

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = ws_logging::init_subscriber();

    info!("Starting ws-api service...");

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        db_path = %config.db_path.display(),
        provisioner_url = %config.provisioner_url,
        info_timeout_ms = config.info_timeout_ms,
        "Configuration loaded"
    );

    if let Some(backup_path) = backup_database(&config.db_path)? {
        info!("Database backed up to: {}", backup_path.display());
    }

    let pool = create_pool(&config.db_path).await?;
    info!("Running database migrations...");
    run_migrations(&pool).await?;
    info!("Migrations complete");

    let provisioner = HttpProvisioner::new(&config.provisioner_url)?;
    let state = AppState::new(pool, Arc::new(provisioner), config.enrichment());
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
