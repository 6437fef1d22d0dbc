use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::instrument;

use crate::shared::{AppError, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StorageHealthResponse {
    pub status: String,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
        environment: state.config.environment.as_str().to_string(),
    })
}

/// GET /health/db - one round trip to the exam store
#[instrument(name = "storage_health", skip(state))]
pub async fn storage_health(
    State(state): State<AppState>,
) -> Result<Json<StorageHealthResponse>, AppError> {
    timeout(state.config.request_timeout, state.exam_repository.ping()).await??;

    Ok(Json(StorageHealthResponse {
        status: "OK".to_string(),
    }))
}
