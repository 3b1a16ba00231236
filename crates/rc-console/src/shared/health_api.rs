//! Health Check Endpoints
//!
//! - /health - Combined health status
//! - /health/live - Liveness probe
//! - /health/ready - Readiness probe

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use utoipa::ToSchema;

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
    Degraded,
}

/// Individual health check result
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub name: String,

    pub status: HealthStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Time taken for the check in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Full health response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,

    pub timestamp: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheck>,
}

/// Simple health status response
#[derive(Debug, Serialize, ToSchema)]
pub struct SimpleHealthResponse {
    pub status: HealthStatus,
}

async fn check_mongo(db: &mongodb::Database) -> HealthCheck {
    let start = std::time::Instant::now();

    let (status, message) = match db.run_command(bson::doc! { "ping": 1 }).await {
        Ok(_) => (HealthStatus::Up, None),
        Err(e) => (HealthStatus::Down, Some(format!("Connection failed: {}", e))),
    };

    HealthCheck {
        name: "mongodb".to_string(),
        status,
        message,
        duration_ms: Some(start.elapsed().as_millis() as u64),
    }
}

/// Health service state
#[derive(Clone)]
pub struct HealthState {
    pub db: Option<mongodb::Database>,
    pub version: Option<String>,
    /// Set once startup wiring is complete
    pub ready: Arc<AtomicBool>,
}

impl HealthState {
    pub fn new(db: Option<mongodb::Database>, version: Option<String>) -> Self {
        Self {
            db,
            version,
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Combined health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    )
)]
pub async fn get_health(State(state): State<HealthState>) -> Response {
    let mut checks = Vec::new();
    let mut overall_status = HealthStatus::Up;

    if let Some(db) = &state.db {
        let check = check_mongo(db).await;
        if check.status == HealthStatus::Down {
            overall_status = HealthStatus::Down;
        }
        checks.push(check);
    }

    if !state.is_ready() && overall_status == HealthStatus::Up {
        overall_status = HealthStatus::Degraded;
    }

    let response = HealthResponse {
        status: overall_status,
        timestamp: Utc::now(),
        version: state.version.clone(),
        checks,
    };

    let status_code = if overall_status == HealthStatus::Down {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(response)).into_response()
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = SimpleHealthResponse)
    )
)]
pub async fn get_liveness() -> Json<SimpleHealthResponse> {
    Json(SimpleHealthResponse {
        status: HealthStatus::Up,
    })
}

/// Readiness probe
///
/// Returns 503 until startup completes or while MongoDB is unreachable.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = SimpleHealthResponse),
        (status = 503, description = "Service is not ready", body = SimpleHealthResponse)
    )
)]
pub async fn get_readiness(State(state): State<HealthState>) -> Response {
    let status = match (&state.db, state.is_ready()) {
        (_, false) => HealthStatus::Down,
        (Some(db), true) => check_mongo(db).await.status,
        (None, true) => HealthStatus::Up,
    };

    let status_code = if status == HealthStatus::Up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(SimpleHealthResponse { status })).into_response()
}

/// Create the health router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(get_health))
        .route("/live", get(get_liveness))
        .route("/ready", get(get_readiness))
        .with_state(state)
}
