//! Student grievance system HTTP server.
//!
//! Serves the grievance API over axum, runs migrations at startup, and
//! spawns the periodic escalation sweep.

mod config;
mod health;
mod logging;
mod openapi;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

use grievance_api::jobs::EscalationSweepJob;
use grievance_api::{grievance_router, ApiState};
use grievance_core::SystemClock;

use config::Config;
use health::{health_handler, livez_handler, readyz_handler};
use openapi::swagger_routes;
use state::AppState;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        "Starting grievance API"
    );

    let pool = match grievance_db::connect(&config.database_url).await {
        Ok(pool) => {
            info!("Database connection established");
            pool
        }
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = grievance_db::run_migrations(&pool).await {
        eprintln!("FATAL: Database migration failed: {e}");
        std::process::exit(1);
    }
    info!("Database migrations applied");

    let clock = Arc::new(SystemClock);
    let api_state = ApiState::new(pool.clone(), clock.clone());
    let app_state = AppState::new(pool.clone());
    let shutting_down = app_state.shutting_down.clone();

    // Periodic escalation sweep so time-based rules fire for idle grievances
    let sweep = EscalationSweepJob::new(api_state.escalation_service.clone())
        .with_interval(Duration::from_secs(config.sweep_interval_secs));
    info!(
        interval_secs = config.sweep_interval_secs,
        "Escalation sweep job started"
    );
    tokio::spawn(sweep.run());

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/livez", get(livez_handler))
        .route("/readyz", get(readyz_handler))
        .merge(swagger_routes())
        .with_state(app_state)
        .nest("/api", grievance_router(pool, clock))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutting_down))
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Graceful shutdown signal handler.
///
/// Sets the `shutting_down` flag before returning so the readiness probe
/// returns 503 to drain traffic before axum stops accepting connections.
async fn shutdown_signal(shutting_down: Arc<std::sync::atomic::AtomicBool>) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    shutting_down.store(true, std::sync::atomic::Ordering::Release);
    info!("Readiness probe set to unhealthy, draining traffic");
}
