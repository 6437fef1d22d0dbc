use axum::{extract::State, Json};
use tracing::{info, instrument, warn};

use super::types::{LoginRequest, LoginResponse};
use crate::shared::{AppError, AppState, JsonBody};

/// HTTP handler for teacher login
///
/// POST /teacher/login
/// Returns a signed token and the teacher's public profile
///
/// A body without usable credentials is a failed login, not a bad request
#[instrument(name = "login", skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<JsonBody<LoginRequest>, AppError>,
) -> Result<Json<LoginResponse>, AppError> {
    let JsonBody(request) = payload.map_err(|_| {
        warn!("Login body could not be parsed");
        AppError::InvalidCredentials
    })?;

    info!(username = %request.username, "Teacher login requested");

    let response = state
        .session_service
        .issue(&request.username, &request.password)
        .await?;

    Ok(Json(response))
}
