use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::AppConfig;
use crate::exam::repository::ExamRepository;
use crate::session::service::SessionService;
use crate::user::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub exam_repository: Arc<dyn ExamRepository + Send + Sync>,
    pub session_service: Arc<SessionService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        exam_repository: Arc<dyn ExamRepository + Send + Sync>,
    ) -> Self {
        let config = Arc::new(config);
        let session_service = Arc::new(SessionService::new(
            Arc::clone(&user_repository),
            &config,
        ));

        Self {
            config,
            user_repository,
            exam_repository,
            session_service,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Missing or malformed authorization header")]
    Unauthenticated,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Teacher not found")]
    TeacherNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken => StatusCode::FORBIDDEN,
            AppError::TeacherNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::StorageUnavailable(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::TeacherNotFound => "TEACHER_NOT_FOUND",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StorageUnavailable(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        AppError::StorageUnavailable("storage request timed out".to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        // serde's message names fields and positions; keep it in the logs only
        warn!(status = %rejection.status(), error = %rejection.body_text(), "Rejected request body");
        AppError::InvalidInput("Invalid request body".to_string())
    }
}

/// JSON body extractor whose rejections use the `AppError` body instead of axum's plain text
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Raw failure detail carried on an error response.
/// Only rendered to the client by `attach_error_details` in development mode.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, detail) = match &self {
            AppError::StorageUnavailable(detail) => {
                error!(error = %detail, "Storage failure");
                ("Server error while processing the request".to_string(), Some(detail.clone()))
            }
            AppError::Internal(detail) => {
                error!(error = %detail, "Internal failure");
                ("Internal server error".to_string(), Some(detail.clone()))
            }
            AppError::InvalidInput(msg) => (msg.clone(), None),
            AppError::NotFound(path) => ("Route not found".to_string(), Some(path.clone())),
            other => (other.to_string(), None),
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        let mut response = (status, body).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(ErrorDetail(detail));
        }
        response
    }
}

/// Rewrites error bodies to include a `details` field when running in development mode.
pub async fn attach_error_details(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;
    if !state.config.environment.is_development() {
        return response;
    }

    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Failed to buffer error body");
            return AppError::Internal(e.to_string()).into_response();
        }
    };

    let mut payload: serde_json::Value = match serde_json::from_slice(&bytes) {
        Ok(payload) => payload,
        Err(_) => return Response::from_parts(parts, Body::from(bytes)),
    };
    if let Some(object) = payload.as_object_mut() {
        object.insert("details".to_string(), json!(detail));
    }

    let rendered = payload.to_string();
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(rendered))
}

/// Fallback for unknown routes
pub async fn handler_404(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Fallback for known routes called with an unsupported method
pub async fn handler_405() -> AppError {
    AppError::MethodNotAllowed
}
