use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use super::{
    password::{self, PasswordError},
    token::TokenConfig,
    types::{LoginResponse, TeacherIdentity},
};
use crate::config::AppConfig;
use crate::shared::AppError;
use crate::user::{UserRepository, TEACHER_ROLE};

/// Issues and verifies teacher session tokens.
///
/// Tokens are self-contained: verification never goes back to the user store,
/// so profile changes (fullname, role) only show up after the next login.
pub struct SessionService {
    token_config: TokenConfig,
    repository: Arc<dyn UserRepository + Send + Sync>,
    request_timeout: Duration,
}

impl SessionService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>, config: &AppConfig) -> Self {
        Self {
            token_config: TokenConfig::from_config(config),
            repository,
            request_timeout: config.request_timeout,
        }
    }

    pub fn token_config(&self) -> &TokenConfig {
        &self.token_config
    }

    /// Exchanges a username/password pair for a signed token.
    ///
    /// Unknown usernames and wrong passwords both yield `InvalidCredentials`.
    #[instrument(skip(self, password))]
    pub async fn issue(&self, username: &str, password: &str) -> Result<LoginResponse, AppError> {
        if username.is_empty() || password.is_empty() {
            warn!("Login attempt with empty credentials");
            return Err(AppError::InvalidCredentials);
        }

        let user = timeout(
            self.request_timeout,
            self.repository.find_teacher_by_username(username),
        )
        .await??;

        let Some(user) = user else {
            self.burn_password_check(password.to_string()).await?;
            info!("Login failed: no teacher with this username");
            return Err(AppError::InvalidCredentials);
        };

        if !self
            .password_matches(password.to_string(), user.password_hash.clone())
            .await?
        {
            info!(teacher_id = user.id, "Login failed: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let identity = TeacherIdentity {
            id: user.id,
            username: user.username,
            fullname: user.fullname,
            role: TEACHER_ROLE.to_string(),
        };
        let token = self.token_config.create_token(&identity)?;

        info!(teacher_id = identity.id, "Teacher logged in");
        Ok(LoginResponse {
            token,
            user: identity,
        })
    }

    /// Resolves a presented token into the identity it was issued for.
    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<TeacherIdentity, AppError> {
        let claims = self.token_config.validate_token(token)?;

        if claims.role != TEACHER_ROLE {
            warn!(teacher_id = claims.teacher_id, role = %claims.role, "Token carries a non-teacher role");
            return Err(AppError::InvalidToken);
        }

        Ok(TeacherIdentity::from(claims))
    }

    /// Argon2 is CPU-bound, so verification runs on the blocking pool
    async fn password_matches(&self, password: String, stored_hash: String) -> Result<bool, AppError> {
        let outcome =
            tokio::task::spawn_blocking(move || password::verify_password(&password, &stored_hash))
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;

        match outcome {
            Ok(matches) => Ok(matches),
            Err(PasswordError::InvalidHashFormat) => {
                warn!("Stored password is not a valid hash, rejecting login");
                Ok(false)
            }
            Err(e) => Err(AppError::Internal(e.to_string())),
        }
    }

    /// Keeps unknown usernames as slow as wrong passwords
    async fn burn_password_check(&self, password: String) -> Result<(), AppError> {
        tokio::task::spawn_blocking(move || password::verify_decoy(&password))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}
