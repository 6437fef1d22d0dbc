use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// The only role this service authenticates
pub const TEACHER_ROLE: &str = "teacher";

/// Database model for the users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    pub password_hash: String, // Argon2id PHC string
    pub fullname: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    /// Creates a teacher account record around an already hashed password
    pub fn teacher(id: i64, username: &str, fullname: &str, password_hash: String) -> Self {
        Self {
            id,
            username: username.to_string(),
            password_hash,
            fullname: fullname.to_string(),
            role: TEACHER_ROLE.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn is_teacher(&self) -> bool {
        self.role == TEACHER_ROLE
    }
}
