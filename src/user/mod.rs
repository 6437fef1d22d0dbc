// Identity store for teacher accounts
pub mod models;
pub mod repository;

pub use models::{UserModel, TEACHER_ROLE};
pub use repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
