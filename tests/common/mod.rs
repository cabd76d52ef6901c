//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use fake::{faker::internet::en::Username, Fake};
use serde_json::Value;
use tower::ServiceExt;

use chat_engine::config::Settings;
use chat_engine::domain::{Channel, User};
use chat_engine::infrastructure::memory::MemoryStore;
use chat_engine::presentation::http::create_router;
use chat_engine::presentation::middleware::issue_token;
use chat_engine::startup::AppState;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub const ALICE: i64 = 1;
pub const BOB: i64 = 2;
pub const CAROL: i64 = 3;
pub const GENERAL: i64 = 1;

/// Test application over an in-memory store
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    /// Create a new test application with alice, bob, carol and #general seeded
    pub async fn new() -> Self {
        Self::with_page_size(10).await
    }

    pub async fn with_page_size(page_size: u32) -> Self {
        let page_size = page_size.to_string();
        let settings = Settings::with_overrides(&[
            ("jwt.secret", TEST_SECRET),
            ("inbox.page_size", page_size.as_str()),
        ])
        .expect("test settings");

        let store = Arc::new(MemoryStore::new());
        store.insert_user(User::new(ALICE, "alice"));
        store.insert_user(User::new(BOB, "bob"));
        store.insert_user(User::new(CAROL, "carol"));
        store.insert_channel(Channel::new(GENERAL, "general"));

        let state = AppState::in_memory(settings, store.clone());
        let router = create_router(state.clone());

        Self { router, state, store }
    }

    /// Insert `count` users with generated handles, ids starting at 100
    pub fn seed_random_users(&self, count: usize) -> Vec<User> {
        (0..count)
            .map(|i| {
                let username: String = Username().fake();
                let user = User::new(100 + i as i64, username);
                self.store.insert_user(user.clone());
                user
            })
            .collect()
    }

    /// Bearer token for a user id
    pub fn token(&self, user_id: i64) -> String {
        issue_token(&self.state.settings.jwt, user_id).expect("token")
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated GET request
    pub async fn get_as(&self, user_id: i64, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header("Authorization", format!("Bearer {}", self.token(user_id)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated POST request with JSON body
    pub async fn post_as(&self, user_id: i64, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", self.token(user_id)))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Make an authenticated POST request without a body
    pub async fn post_empty_as(&self, user_id: i64, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Authorization", format!("Bearer {}", self.token(user_id)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Post a channel message as `author` and return its id
    pub async fn say(&self, author: i64, content: &str) -> String {
        let (status, body) = self
            .post_as(
                author,
                "/api/v1/messages",
                serde_json::json!({ "content": content, "channel_id": GENERAL.to_string() }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "send failed: {body}");
        body["id"].as_str().expect("message id").to_string()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }
}
