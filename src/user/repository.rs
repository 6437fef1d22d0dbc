use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{UserModel, TEACHER_ROLE};
use crate::shared::AppError;

/// Trait for teacher lookups against the user store
#[async_trait]
pub trait UserRepository {
    /// Fetches at most one user with the given username and the teacher role
    async fn find_teacher_by_username(&self, username: &str)
        -> Result<Option<UserModel>, AppError>;

    /// Resolves the display name of the teacher with the given id
    async fn find_teacher_fullname(&self, teacher_id: i64) -> Result<Option<String>, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<i64, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated users
    pub fn with_users(users: Vec<UserModel>) -> Self {
        let users = users.into_iter().map(|user| (user.id, user)).collect();
        Self {
            users: RwLock::new(users),
        }
    }

    pub async fn insert(&self, user: UserModel) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self))]
    async fn find_teacher_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserModel>, AppError> {
        let users = self.users.read().await;
        let user = users
            .values()
            .find(|user| user.username == username && user.is_teacher())
            .cloned();

        debug!(found = user.is_some(), "Teacher lookup by username in memory");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_teacher_fullname(&self, teacher_id: i64) -> Result<Option<String>, AppError> {
        let users = self.users.read().await;
        Ok(users
            .get(&teacher_id)
            .filter(|user| user.is_teacher())
            .map(|user| user.fullname.clone()))
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self))]
    async fn find_teacher_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserModel>, AppError> {
        debug!("Fetching teacher by username from database");

        sqlx::query_as::<_, UserModel>(
            "SELECT id, username, password_hash, fullname, role, created_at FROM users WHERE username = $1 AND role = $2 LIMIT 1",
        )
        .bind(username)
        .bind(TEACHER_ROLE)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch teacher by username");
            AppError::from(e)
        })
    }

    #[instrument(skip(self))]
    async fn find_teacher_fullname(&self, teacher_id: i64) -> Result<Option<String>, AppError> {
        debug!("Fetching teacher fullname from database");

        sqlx::query_scalar::<_, String>("SELECT fullname FROM users WHERE id = $1 AND role = $2")
            .bind(teacher_id)
            .bind(TEACHER_ROLE)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, teacher_id, "Failed to fetch teacher fullname");
                AppError::from(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_users() -> Vec<UserModel> {
        let mut student = UserModel::teacher(2, "s1", "Student One", "hash".to_string());
        student.role = "student".to_string();
        vec![
            UserModel::teacher(1, "t1", "Teacher One", "hash".to_string()),
            student,
        ]
    }

    #[tokio::test]
    async fn test_find_teacher_by_username() {
        let repo = InMemoryUserRepository::with_users(sample_users());

        let teacher = repo.find_teacher_by_username("t1").await.unwrap().unwrap();
        assert_eq!(teacher.id, 1);
        assert_eq!(teacher.fullname, "Teacher One");
    }

    #[tokio::test]
    async fn test_non_teacher_is_invisible() {
        let repo = InMemoryUserRepository::with_users(sample_users());

        assert!(repo.find_teacher_by_username("s1").await.unwrap().is_none());
        assert!(repo.find_teacher_fullname(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_teacher_fullname() {
        let repo = InMemoryUserRepository::new();
        repo.insert(UserModel::teacher(9, "t9", "Nine", "hash".to_string()))
            .await;

        assert_eq!(
            repo.find_teacher_fullname(9).await.unwrap(),
            Some("Nine".to_string())
        );
        assert!(repo.find_teacher_fullname(10).await.unwrap().is_none());
    }
}
