//! Test setup infrastructure - builds the full router over in-memory stores
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

use exam_portal::{
    exam::{
        models::{AssignmentStatus, ExamModel},
        repository::{ExamRepository, InMemoryExamRepository},
    },
    session::password::hash_password,
    user::{InMemoryUserRepository, UserModel},
    AppConfig, AppError, AppState, Environment,
};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEACHER_PASSWORD: &str = "correct-horse-battery";

pub struct TestSetup {
    pub app: Router,
    pub state: AppState,
    pub exams: Arc<InMemoryExamRepository>,
}

pub struct TestSetupBuilder {
    config: AppConfig,
    teachers: Vec<(i64, &'static str, &'static str)>,
    exams: Vec<ExamModel>,
    assignments: Vec<(i64, i64, AssignmentStatus)>,
    exam_repository: Option<Arc<dyn ExamRepository + Send + Sync>>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::new(TEST_SECRET),
            teachers: vec![],
            exams: vec![],
            assignments: vec![],
            exam_repository: None,
        }
    }

    /// Adds a teacher account whose password is `TEACHER_PASSWORD`
    pub fn with_teacher(mut self, id: i64, username: &'static str, fullname: &'static str) -> Self {
        self.teachers.push((id, username, fullname));
        self
    }

    pub fn with_exam(mut self, id: i64, teacher_id: i64, title: &str, created_at: DateTime<Utc>) -> Self {
        self.exams.push(ExamModel {
            id,
            teacher_id,
            title: title.to_string(),
            description: format!("{} description", title),
            time_limit: 30,
            created_at,
        });
        self
    }

    pub fn with_assignment(mut self, exam_id: i64, student_id: i64, status: AssignmentStatus) -> Self {
        self.assignments.push((exam_id, student_id, status));
        self
    }

    pub fn in_development(mut self) -> Self {
        self.config = self.config.with_environment(Environment::Development);
        self
    }

    /// Replaces the exam store, e.g. with one that always fails
    pub fn with_exam_repository(mut self, repo: Arc<dyn ExamRepository + Send + Sync>) -> Self {
        self.exam_repository = Some(repo);
        self
    }

    pub async fn build(self) -> TestSetup {
        let users = InMemoryUserRepository::new();
        for (id, username, fullname) in &self.teachers {
            let hash = hash_password(TEACHER_PASSWORD).unwrap();
            users
                .insert(UserModel::teacher(*id, username, fullname, hash))
                .await;
        }

        let exams = Arc::new(InMemoryExamRepository::with_exams(self.exams));
        for (exam_id, student_id, status) in self.assignments {
            exams.assign(exam_id, student_id, status).await;
        }

        let exam_repository: Arc<dyn ExamRepository + Send + Sync> = match self.exam_repository {
            Some(repo) => repo,
            None => exams.clone(),
        };

        let state = AppState::new(self.config, Arc::new(users), exam_repository);
        let app = exam_portal::app(state.clone());

        TestSetup { app, state, exams }
    }
}

pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap()
}

/// Exam store whose backend is unreachable
pub struct UnreachableExamRepository;

#[async_trait::async_trait]
impl ExamRepository for UnreachableExamRepository {
    async fn list_exams_by_teacher(&self, _teacher_id: i64) -> Result<Vec<ExamModel>, AppError> {
        Err(AppError::StorageUnavailable("pool timed out while waiting for an open connection".to_string()))
    }

    async fn count_exams_with_status(
        &self,
        _teacher_id: i64,
        _status: AssignmentStatus,
    ) -> Result<i64, AppError> {
        Err(AppError::StorageUnavailable("pool timed out while waiting for an open connection".to_string()))
    }

    async fn create_exam(&self, _exam: &exam_portal::exam::models::NewExam) -> Result<i64, AppError> {
        Err(AppError::StorageUnavailable("pool timed out while waiting for an open connection".to_string()))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::StorageUnavailable("pool timed out while waiting for an open connection".to_string()))
    }
}
