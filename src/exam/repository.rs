use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{sort_most_recent_first, AssignedExamModel, AssignmentStatus, ExamModel, NewExam};
use crate::shared::AppError;

/// Trait for exam repository operations
#[async_trait]
pub trait ExamRepository {
    /// All exams owned by the teacher, most recent first
    async fn list_exams_by_teacher(&self, teacher_id: i64) -> Result<Vec<ExamModel>, AppError>;

    /// Number of distinct exams of the teacher with at least one assignment in `status`
    async fn count_exams_with_status(
        &self,
        teacher_id: i64,
        status: AssignmentStatus,
    ) -> Result<i64, AppError>;

    /// Inserts an exam and returns its id
    async fn create_exam(&self, exam: &NewExam) -> Result<i64, AppError>;

    /// Round trip to the store, for health checks
    async fn ping(&self) -> Result<(), AppError>;
}

#[derive(Default)]
struct ExamStore {
    exams: Vec<ExamModel>,
    assignments: Vec<AssignedExamModel>,
    next_id: i64,
}

/// In-memory implementation of ExamRepository for development and testing
pub struct InMemoryExamRepository {
    store: RwLock<ExamStore>,
}

impl Default for InMemoryExamRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryExamRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self::with_exams(Vec::new())
    }

    /// Creates an in-memory repository with pre-populated exams
    pub fn with_exams(exams: Vec<ExamModel>) -> Self {
        let next_id = exams.iter().map(|exam| exam.id).max().unwrap_or(0) + 1;
        Self {
            store: RwLock::new(ExamStore {
                exams,
                assignments: Vec::new(),
                next_id,
            }),
        }
    }

    /// Records a student's assignment to an exam
    pub async fn assign(&self, exam_id: i64, student_id: i64, status: AssignmentStatus) {
        self.store.write().await.assignments.push(AssignedExamModel {
            exam_id,
            student_id,
            status,
        });
    }

    /// Returns the current number of exams in the repository
    pub async fn exam_count(&self) -> usize {
        self.store.read().await.exams.len()
    }
}

#[async_trait]
impl ExamRepository for InMemoryExamRepository {
    #[instrument(skip(self))]
    async fn list_exams_by_teacher(&self, teacher_id: i64) -> Result<Vec<ExamModel>, AppError> {
        let store = self.store.read().await;
        let mut exams: Vec<ExamModel> = store
            .exams
            .iter()
            .filter(|exam| exam.teacher_id == teacher_id)
            .cloned()
            .collect();
        sort_most_recent_first(&mut exams);

        debug!(exam_count = exams.len(), "Exams fetched from memory");
        Ok(exams)
    }

    #[instrument(skip(self))]
    async fn count_exams_with_status(
        &self,
        teacher_id: i64,
        status: AssignmentStatus,
    ) -> Result<i64, AppError> {
        let store = self.store.read().await;
        let owned: HashSet<i64> = store
            .exams
            .iter()
            .filter(|exam| exam.teacher_id == teacher_id)
            .map(|exam| exam.id)
            .collect();

        let matching: HashSet<i64> = store
            .assignments
            .iter()
            .filter(|assignment| assignment.status == status && owned.contains(&assignment.exam_id))
            .map(|assignment| assignment.exam_id)
            .collect();

        Ok(matching.len() as i64)
    }

    #[instrument(skip(self, exam), fields(teacher_id = exam.teacher_id))]
    async fn create_exam(&self, exam: &NewExam) -> Result<i64, AppError> {
        let mut store = self.store.write().await;
        let id = store.next_id;
        store.next_id += 1;
        store.exams.push(ExamModel {
            id,
            teacher_id: exam.teacher_id,
            title: exam.title.clone(),
            description: exam.description.clone(),
            time_limit: exam.time_limit,
            created_at: Utc::now(),
        });

        debug!(exam_id = id, "Exam created in memory");
        Ok(id)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// PostgreSQL implementation of exam repository
pub struct PostgresExamRepository {
    pool: PgPool,
}

impl PostgresExamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExamRepository for PostgresExamRepository {
    #[instrument(skip(self))]
    async fn list_exams_by_teacher(&self, teacher_id: i64) -> Result<Vec<ExamModel>, AppError> {
        let exams = sqlx::query_as::<_, ExamModel>(
            "SELECT id, teacher_id, title, description, time_limit, created_at FROM exams WHERE teacher_id = $1 ORDER BY created_at DESC, id ASC",
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch exams");
            AppError::from(e)
        })?;

        debug!(exam_count = exams.len(), "Exams fetched from database");
        Ok(exams)
    }

    #[instrument(skip(self))]
    async fn count_exams_with_status(
        &self,
        teacher_id: i64,
        status: AssignmentStatus,
    ) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT ae.exam_id) FROM assigned_exams ae JOIN exams e ON e.id = ae.exam_id WHERE e.teacher_id = $1 AND ae.status = $2",
        )
        .bind(teacher_id)
        .bind(status.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, %status, "Failed to count exams by assignment status");
            AppError::from(e)
        })
    }

    #[instrument(skip(self, exam), fields(teacher_id = exam.teacher_id))]
    async fn create_exam(&self, exam: &NewExam) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO exams (teacher_id, title, description, time_limit) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(exam.teacher_id)
        .bind(&exam.title)
        .bind(&exam.description)
        .bind(exam.time_limit)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert exam");
            AppError::from(e)
        })?;

        debug!(exam_id = id, "Exam created in database");
        Ok(id)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
