use anyhow::Context;
use barrage_orchestrator::api;
use barrage_orchestrator::config::OrchestratorConfig;
use barrage_orchestrator::repository::InMemoryJobStore;
use barrage_orchestrator::service::retention_service;
use barrage_orchestrator::state::AppState;
use barrage_runner::HttpRequestExecutor;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "barrage_orchestrator=info,barrage_runner=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Barrage Orchestrator...");

    let config = OrchestratorConfig::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing::info!("Configuration loaded: {:?}", config);

    let executor = HttpRequestExecutor::new(&config.runner)
        .context("Failed to build HTTP client for load requests")?;
    let store = Arc::new(InMemoryJobStore::new());

    let state = AppState::new(store.clone(), Arc::new(executor), &config);
    let active = Arc::clone(&state.active);

    let sweeper = if config.retention_enabled() {
        Some(retention_service::spawn_retention_sweeper(
            store.clone(),
            config.job_retention,
            config.sweep_interval,
        ))
    } else {
        tracing::info!("Job retention disabled; finished jobs are kept until shutdown");
        None
    };

    // Build router with all API endpoints
    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }

    if !active.is_empty() {
        tracing::warn!(
            "Shutting down with {} job(s) still running; their results are lost",
            active.len()
        );
    }
    tracing::debug!("{} job(s) retained at shutdown", store.len());

    tracing::info!("Barrage Orchestrator stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
