use axum::{extract::State, Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::DashboardService,
    types::{CreateExamRequest, CreateExamResponse, DashboardResponse},
};
use crate::session::TeacherIdentity;
use crate::shared::{AppError, AppState, JsonBody};

fn dashboard_service(state: &AppState) -> DashboardService {
    DashboardService::new(
        Arc::clone(&state.exam_repository),
        Arc::clone(&state.user_repository),
        state.config.request_timeout,
    )
}

/// HTTP handler for the teacher dashboard
///
/// GET /teacher/dashboard
#[instrument(name = "dashboard", skip(state, identity), fields(teacher_id = identity.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(identity): Extension<TeacherIdentity>,
) -> Result<Json<DashboardResponse>, AppError> {
    let view = dashboard_service(&state).get_dashboard(identity.id).await?;
    let response = DashboardResponse::from(view);

    info!(
        total_exams = response.total_exams,
        active_exams = response.active_exams,
        completed_exams = response.completed_exams,
        "Dashboard assembled"
    );

    Ok(Json(response))
}

/// HTTP handler for creating an exam owned by the caller
///
/// POST /teacher/exams
#[instrument(name = "create_exam", skip(state, identity, request), fields(teacher_id = identity.id))]
pub async fn create_exam(
    State(state): State<AppState>,
    Extension(identity): Extension<TeacherIdentity>,
    JsonBody(request): JsonBody<CreateExamRequest>,
) -> Result<Json<CreateExamResponse>, AppError> {
    let exam_id = dashboard_service(&state)
        .create_exam(identity.id, request)
        .await?;

    Ok(Json(CreateExamResponse { exam_id }))
}
