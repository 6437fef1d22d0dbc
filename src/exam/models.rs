use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{AsRefStr, Display, EnumString};

/// Database model for the exams table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct ExamModel {
    pub id: i64,
    pub teacher_id: i64, // Owning teacher
    pub title: String,
    pub description: String,
    pub time_limit: i32, // Minutes
    pub created_at: DateTime<Utc>,
}

/// Validated fields for inserting an exam
#[derive(Debug, Clone)]
pub struct NewExam {
    pub teacher_id: i64,
    pub title: String,
    pub description: String,
    pub time_limit: i32,
}

/// Status of a per-student exam assignment, stored as lowercase text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Completed,
}

/// A student's assignment to an exam
#[derive(Debug, Clone)]
pub struct AssignedExamModel {
    pub exam_id: i64,
    pub student_id: i64,
    pub status: AssignmentStatus,
}

/// Aggregate view of a teacher's exams, recomputed per request
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub fullname: String,
    pub exams: Vec<ExamModel>, // Most recent first
    pub active_exam_count: i64,
    pub completed_exam_count: i64,
}

/// Orders exams most recent first, oldest id first among equal timestamps
pub fn sort_most_recent_first(exams: &mut [ExamModel]) {
    exams.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}
