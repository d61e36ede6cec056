use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::AppState;

const BACKEND_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

/// Individual component health details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub version: String,
    pub timestamp: String,
    pub backend: ComponentHealth,
}

/// Tracks application start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize the start time (call this on application startup)
pub fn init_start_time() {
    let _ = START_TIME.get_or_init(Instant::now);
}

pub fn uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

/// Opens an item subscription and waits for its first snapshot.
async fn check_backend(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    let mut subscription = state.store.subscribe_items();
    let token = subscription.cancellation_token();
    let first = tokio::time::timeout(BACKEND_CHECK_TIMEOUT, subscription.next()).await;
    token.cancel();

    let latency_ms = Some(start.elapsed().as_millis() as u64);
    match first {
        Ok(Some(Ok(_))) => ComponentHealth {
            status: ComponentStatus::Up,
            message: "Snapshot received".to_string(),
            latency_ms,
        },
        Ok(Some(Err(e))) => ComponentHealth {
            status: ComponentStatus::Down,
            message: format!("Subscription failed: {}", e),
            latency_ms,
        },
        Ok(None) => ComponentHealth {
            status: ComponentStatus::Down,
            message: "Subscription ended without a snapshot".to_string(),
            latency_ms,
        },
        Err(_) => ComponentHealth {
            status: ComponentStatus::Down,
            message: "Timed out waiting for a snapshot".to_string(),
            latency_ms,
        },
    }
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let backend = check_backend(&state).await;
    let status_code = match backend.status {
        ComponentStatus::Up => StatusCode::OK,
        ComponentStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };

    let response = HealthResponse {
        status: backend.status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        backend,
    };

    (status_code, Json(response))
}

/// Liveness only: answers as long as the process runs
async fn liveness_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "up",
        "uptime_secs": uptime_secs(),
    }))
}

/// Creates the router for health check endpoints
///
/// Endpoints:
/// - GET /health       - Backend check (503 when the backend refuses queries)
/// - GET /health/live  - Liveness probe
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness_check))
}
