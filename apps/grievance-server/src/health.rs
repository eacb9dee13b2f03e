//! Health and Kubernetes probe handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Overall health status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

/// Body of the `/health` and `/readyz` responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthState,
    pub database: HealthState,
    pub version: &'static str,
}

/// Body of the `/livez` response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LivenessResponse {
    pub status: HealthState,
}

async fn database_state(state: &AppState) -> HealthState {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => HealthState::Healthy,
        Err(err) => {
            tracing::warn!(error = %err, "Database health check failed");
            HealthState::Unhealthy
        }
    }
}

/// Service health: pings the database.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "A dependency is unhealthy", body = HealthResponse)
    )
)]
pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = database_state(&state).await;
    let (status, code) = match database {
        HealthState::Healthy => (HealthState::Healthy, StatusCode::OK),
        HealthState::Unhealthy => (HealthState::Unhealthy, StatusCode::SERVICE_UNAVAILABLE),
    };
    (
        code,
        Json(HealthResponse {
            status,
            database,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Liveness probe: always 200 while the process can serve requests.
#[utoipa::path(
    get,
    path = "/livez",
    tag = "Health",
    responses((status = 200, description = "Process is alive", body = LivenessResponse))
)]
pub async fn livez_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: HealthState::Healthy,
    })
}

/// Readiness probe: 503 while shutting down or when the database is
/// unreachable, so load balancers drain traffic.
#[utoipa::path(
    get,
    path = "/readyz",
    tag = "Health",
    responses(
        (status = 200, description = "Ready to serve traffic", body = HealthResponse),
        (status = 503, description = "Not ready", body = HealthResponse)
    )
)]
pub async fn readyz_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    if state.is_shutting_down() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: HealthState::Unhealthy,
                database: HealthState::Unhealthy,
                version: env!("CARGO_PKG_VERSION"),
            }),
        );
    }
    health_handler(State(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_state() -> AppState {
        let pool = grievance_db::connect_in_memory().await.unwrap();
        AppState::new(pool)
    }

    #[tokio::test]
    async fn health_reports_healthy_with_live_pool() {
        let state = test_state().await;
        let (code, Json(body)) = health_handler(State(state)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.status, HealthState::Healthy);
        assert_eq!(body.database, HealthState::Healthy);
    }

    #[tokio::test]
    async fn readyz_returns_503_while_shutting_down() {
        let state = test_state().await;
        state
            .shutting_down
            .store(true, std::sync::atomic::Ordering::Release);
        let (code, _) = readyz_handler(State(state)).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
    }
}
