use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};

use super::types::{SessionClaims, TeacherIdentity};
use crate::config::AppConfig;
use crate::shared::AppError;

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub ttl_hours: i64,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_hours,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.jwt_secret.clone(), config.token_ttl_hours)
    }

    /// Creates a signed token for the given identity, issued now
    pub fn create_token(&self, identity: &TeacherIdentity) -> Result<String, AppError> {
        self.create_token_at(identity, Utc::now())
    }

    /// Creates a signed token as if issued at `issued_at`
    #[instrument(skip(self, identity), fields(teacher_id = identity.id))]
    pub fn create_token_at(
        &self,
        identity: &TeacherIdentity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let exp = (issued_at + Duration::hours(self.ttl_hours)).timestamp() as usize;

        debug!(
            ttl_hours = self.ttl_hours,
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = SessionClaims {
            teacher_id: identity.id,
            username: identity.username.clone(),
            role: identity.role.clone(),
            fullname: identity.fullname.clone(),
            exp,
            iat: issued_at.timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::Internal(e.to_string())
        })
    }

    /// Validates signature and expiry, returning the claims if valid
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        debug!("Decoding and validating JWT token");

        let mut validation = Validation::new(Algorithm::HS256);
        // exp is a hard cutoff
        validation.leeway = 0;

        let claims = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::InvalidToken
        })?;

        // jsonwebtoken only rejects exp < now; the token is dead from exp onwards
        if claims.exp as i64 <= Utc::now().timestamp() {
            debug!(exp = claims.exp, "JWT token reached its expiry");
            return Err(AppError::InvalidToken);
        }

        debug!(
            teacher_id = claims.teacher_id,
            exp = claims.exp,
            "JWT token decoded successfully"
        );
        Ok(claims)
    }
}
