//! Shared helpers for driving the router in-process.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use blogwire::config::Config;
use blogwire::{api, db, AppState};

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

impl TestApp {
    /// Router over a fresh in-memory database
    pub async fn new() -> Self {
        let mut config = Config::default();
        config.database.url = "sqlite::memory:".to_string();
        config.auth.secret = "test-secret".to_string();

        let pool = db::init(&config.database).await.expect("database init");
        let state = Arc::new(AppState::new(config, pool).expect("app state"));
        let router = api::create_router(state.clone());
        Self { router, state }
    }

    /// Same as `new`, with the fixture data loaded
    pub async fn seeded() -> Self {
        let app = Self::new().await;
        db::seed_fixtures(&app.state.db).await.expect("seed");
        app
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), token).await
    }

    pub async fn put(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body), token).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None, token).await
    }

    /// Register a user and log in, returning (user id, token)
    pub async fn register_and_login(&self, username: &str, password: &str) -> (String, String) {
        let (status, user) = self
            .post(
                "/api/users",
                serde_json::json!({ "username": username, "name": "Test User", "password": password }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", user);

        let token = self.login(username, password).await;
        (user["id"].as_str().expect("id").to_string(), token)
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/login",
                serde_json::json!({ "username": username, "password": password }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().expect("token").to_string()
    }
}
