//! Request helpers - drive the router the way an HTTP client would
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

use super::setup::{TestSetup, TEACHER_PASSWORD};

pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestSetup {
    pub async fn send(&self, request: Request<Body>) -> ApiResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        ApiResponse { status, body }
    }

    pub async fn login_as(&self, username: &str, password: &str) -> ApiResponse {
        let body = serde_json::json!({ "username": username, "password": password });
        let request = Request::builder()
            .method("POST")
            .uri("/api/teacher/login")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Logs in with the shared test password and returns the token
    pub async fn token_for(&self, username: &str) -> String {
        let response = self.login_as(username, TEACHER_PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.body["token"].as_str().unwrap().to_string()
    }

    pub async fn dashboard(&self, authorization: Option<&str>) -> ApiResponse {
        let mut builder = Request::builder().uri("/api/teacher/dashboard");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn dashboard_with_token(&self, token: &str) -> ApiResponse {
        self.dashboard(Some(&format!("Bearer {}", token))).await
    }

    pub async fn create_exam(&self, token: &str, body: Value) -> ApiResponse {
        let request = Request::builder()
            .method("POST")
            .uri("/api/teacher/exams")
            .header("content-type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}
