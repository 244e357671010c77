use std::sync::Arc;

use anyhow::Context;
use thesis_server::api::{AppState, create_router};
use thesis_server::config::AppConfig;
use thesis_server::db::connect_and_migrate;
use thesis_server::service::seed;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let config = AppConfig::from_env().context("failed to load configuration")?;
    if config.uses_dev_secret() {
        warn!("SECRET_KEY is not set, using the development key");
    }

    let db = connect_and_migrate(&config.database_url)
        .await
        .context("failed to connect to database")?;
    let state = Arc::new(AppState::new(db, config));
    state
        .storage
        .ensure_root()
        .await
        .context("failed to create upload folder")?;

    match std::env::args().nth(1).as_deref() {
        Some("init") => run_init(&state).await,
        Some(other) => anyhow::bail!("unknown command: {other}. expected `init` or no argument"),
        None => serve(state).await,
    }
}

async fn run_init(state: &AppState) -> anyhow::Result<()> {
    let report = seed(state).await.context("failed to seed database")?;
    info!(
        lookups_inserted = report.lookups_inserted,
        admin_created = report.admin_created,
        teacher_created = report.teacher_created,
        student_created = report.student_created,
        process_status_created = report.process_status_created,
        "database initialized"
    );
    Ok(())
}

async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let bind_addr = state.config.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "thesis server listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received, stopping server");
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}
