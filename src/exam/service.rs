use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{AssignmentStatus, DashboardView, NewExam},
    repository::ExamRepository,
    types::CreateExamRequest,
};
use crate::shared::AppError;
use crate::user::UserRepository;

/// Service for the teacher dashboard and exam creation
pub struct DashboardService {
    exams: Arc<dyn ExamRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
    request_timeout: Duration,
}

impl DashboardService {
    pub fn new(
        exams: Arc<dyn ExamRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            exams,
            users,
            request_timeout,
        }
    }

    /// Builds the dashboard view for a teacher.
    ///
    /// The fullname, exam list and both counts are fetched concurrently and the
    /// view is only assembled once all four succeed.
    #[instrument(skip(self))]
    pub async fn get_dashboard(&self, teacher_id: i64) -> Result<DashboardView, AppError> {
        let fetch = async {
            tokio::try_join!(
                self.users.find_teacher_fullname(teacher_id),
                self.exams.list_exams_by_teacher(teacher_id),
                self.exams
                    .count_exams_with_status(teacher_id, AssignmentStatus::Pending),
                self.exams
                    .count_exams_with_status(teacher_id, AssignmentStatus::Completed),
            )
        };

        let (fullname, exams, active_exam_count, completed_exam_count) =
            timeout(self.request_timeout, fetch).await.map_err(|e| {
                warn!(teacher_id, "Dashboard fetch timed out");
                AppError::from(e)
            })??;

        let Some(fullname) = fullname else {
            warn!(teacher_id, "Teacher not found for dashboard");
            return Err(AppError::TeacherNotFound);
        };

        debug!(
            exam_count = exams.len(),
            active_exam_count, completed_exam_count, "Dashboard data fetched"
        );

        Ok(DashboardView {
            fullname,
            exams,
            active_exam_count,
            completed_exam_count,
        })
    }

    /// Creates an exam owned by the teacher and returns its id
    #[instrument(skip(self, request))]
    pub async fn create_exam(
        &self,
        teacher_id: i64,
        request: CreateExamRequest,
    ) -> Result<i64, AppError> {
        let exam = validate_new_exam(teacher_id, request)?;

        let exam_id = timeout(self.request_timeout, self.exams.create_exam(&exam)).await??;

        info!(exam_id, teacher_id, title = %exam.title, "Exam created");
        Ok(exam_id)
    }
}

fn validate_new_exam(teacher_id: i64, request: CreateExamRequest) -> Result<NewExam, AppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("title must not be empty".to_string()));
    }
    if request.time_limit <= 0 {
        return Err(AppError::InvalidInput(
            "time_limit must be a positive number of minutes".to_string(),
        ));
    }

    Ok(NewExam {
        teacher_id,
        title: title.to_string(),
        description: request.description,
        time_limit: request.time_limit,
    })
}
