use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{DashboardView, ExamModel};

/// Number of exams shown in the dashboard's recent list
pub const RECENT_EXAM_LIMIT: usize = 3;

/// Request payload for creating an exam
#[derive(Debug, Deserialize)]
pub struct CreateExamRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub time_limit: i32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateExamResponse {
    pub exam_id: i64,
}

/// Exam as exposed to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExamResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub time_limit: i32,
    pub created_at: DateTime<Utc>,
}

impl From<ExamModel> for ExamResponse {
    fn from(exam: ExamModel) -> Self {
        Self {
            id: exam.id,
            title: exam.title,
            description: exam.description,
            time_limit: exam.time_limit,
            created_at: exam.created_at,
        }
    }
}

/// Dashboard payload: the full ordered list plus a bounded recent view
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DashboardResponse {
    pub fullname: String,
    pub total_exams: usize,
    pub active_exams: i64,
    pub completed_exams: i64,
    pub exams: Vec<ExamResponse>,
    pub recent_exams: Vec<ExamResponse>,
}

impl From<DashboardView> for DashboardResponse {
    fn from(view: DashboardView) -> Self {
        let exams: Vec<ExamResponse> = view.exams.into_iter().map(ExamResponse::from).collect();
        let recent_exams = exams.iter().take(RECENT_EXAM_LIMIT).cloned().collect();

        Self {
            fullname: view.fullname,
            total_exams: exams.len(),
            active_exams: view.active_exam_count,
            completed_exams: view.completed_exam_count,
            exams,
            recent_exams,
        }
    }
}
