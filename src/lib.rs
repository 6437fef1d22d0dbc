// Library crate for the exam portal backend
// This file exposes the router and modules for the binary and integration tests

pub mod config;
pub mod exam;
pub mod health;
pub mod session;
pub mod shared;
pub mod user;

pub use config::{AppConfig, Environment};
pub use shared::{AppError, AppState};

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Builds the application router with all routes nested under the configured base path
pub fn app(state: AppState) -> Router {
    // Authorization runs before any protected handler
    let protected = Router::new()
        .route("/teacher/dashboard", get(exam::dashboard))
        .route("/teacher/exams", post(exam::create_exam))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::jwt_auth,
        ));

    let api = Router::new()
        .route("/teacher/login", post(session::login))
        .route("/health", get(health::health))
        .route("/health/db", get(health::storage_health))
        .merge(protected);

    let base_path = state.config.api_base_path.clone();
    let routes = if base_path.is_empty() {
        api
    } else {
        Router::new().nest(&base_path, api)
    };

    routes
        .method_not_allowed_fallback(shared::handler_405)
        .fallback(shared::handler_404)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            shared::attach_error_details,
        ))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origin = if config.cors_origin.trim() == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origin
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
