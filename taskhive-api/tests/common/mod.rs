//! Common test utilities for API tests
//!
//! The router runs over in-memory repositories with a cheap password hasher.
//! The database pool is lazy and never connected, so `/health` is not
//! exercised here.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use taskhive_api::app::{build_router, AppState};
use taskhive_api::config::Config;
use taskhive_shared::auth::password::{Argon2Hasher, HashParams};
use taskhive_shared::db::pool::{create_lazy_pool, DatabaseConfig};
use taskhive_shared::services::credentials::TokenSettings;
use taskhive_shared::services::{ServiceDeps, Services};
use tower::ServiceExt;

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const DATABASE_URL: &str = "postgresql://localhost/taskhive_test";

/// Test context holding the router under test
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some(DATABASE_URL.to_string()),
            "JWT_SECRET" => Some(SECRET.to_string()),
            _ => None,
        })
        .unwrap();

        let mut db_config = DatabaseConfig::new(DATABASE_URL);
        db_config.min_connections = 0;
        let db = create_lazy_pool(&db_config).unwrap();

        let hasher = Argon2Hasher::new(HashParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        });
        let services = Services::build(
            ServiceDeps::in_memory(TokenSettings::new(SECRET)).with_hasher(Arc::new(hasher)),
        );

        let app = build_router(AppState::new(db, config.clone(), services));

        TestContext { app, config }
    }

    /// Sends a request, optionally with a bearer token and a JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Registers a manager and returns its session token and user id
    pub async fn manager(&self, email: &str) -> (String, String) {
        let response = self
            .send(
                "POST",
                "/v1/auth/register",
                None,
                Some(serde_json::json!({
                    "email": email,
                    "password": "pw1",
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let user = body_json(response).await;

        let token = self.login(email, "pw1").await;
        (token, user["user_id"].as_str().unwrap().to_string())
    }

    /// Creates a worker under `manager_token` and returns its token and id
    pub async fn worker(&self, manager_token: &str, email: &str) -> (String, String) {
        let response = self
            .send(
                "POST",
                "/v1/users/devs",
                Some(manager_token),
                Some(serde_json::json!({
                    "email": email,
                    "password": "pw2",
                    "first_name": "Grace",
                    "last_name": "Hopper",
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let user = body_json(response).await;

        let token = self.login(email, "pw2").await;
        (token, user["user_id"].as_str().unwrap().to_string())
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .send(
                "POST",
                "/v1/auth/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"].as_str().unwrap().to_string()
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
