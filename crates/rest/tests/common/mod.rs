//! Common test utilities for API testing.
//!
//! [`TestApp`] serves the full router over the in-memory backend and keeps
//! a handle on the backend so tests can seed records directly.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, header};
use axum_test::{TestResponse, TestServer};
use chrono::{DateTime, TimeZone, Utc};
use feedkeeper_persistence::FeedStorage;
use feedkeeper_persistence::backends::memory::MemoryBackend;
use feedkeeper_persistence::types::{Post, PostDraft, Source, SourceDraft, User, UserDraft};
use feedkeeper_rest::{ServerConfig, create_app_with_shared};
use serde_json::Value;

pub const SOURCES: &str = "/api/v1/feed/source/";

/// A running app with one authenticated user.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<MemoryBackend>,
    pub owner: User,
    pub token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let storage = Arc::new(MemoryBackend::new());
        let app = create_app_with_shared(Arc::clone(&storage), ServerConfig::for_testing())
            .expect("Failed to build app");
        let server = TestServer::new(app).expect("Failed to create test server");

        let (owner, token) = register(&storage, "owner@example.com").await;

        Self {
            server,
            storage,
            owner,
            token,
        }
    }

    /// Creates another user and returns it with a token.
    pub async fn stranger(&self) -> (User, String) {
        register(&self.storage, "stranger@example.com").await
    }

    /// Authorization header for the owner.
    pub fn auth(&self) -> (HeaderName, HeaderValue) {
        bearer(&self.token)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let (name, value) = self.auth();
        self.server.get(path).add_header(name, value).await
    }

    pub async fn seed_sources(&self, names: &[&str]) -> Vec<Source> {
        let mut out = Vec::new();
        for name in names {
            let feed = format!("https://{}.example/feed", name.to_lowercase());
            let source = self
                .storage
                .create_source(&self.owner, SourceDraft::new(*name, feed))
                .await
                .expect("Failed to seed source");
            out.push(source);
        }
        out
    }

    pub async fn seed_posts(&self, source: &Source, posts: &[(&str, u32)]) -> Vec<Post> {
        let mut out = Vec::new();
        for (title, d) in posts {
            let post = self
                .storage
                .create_post(
                    &self.owner,
                    source.id,
                    PostDraft::new(*title, "body").created_at(day(*d)),
                )
                .await
                .expect("Failed to seed post");
            out.push(post);
        }
        out
    }
}

async fn register(storage: &MemoryBackend, email: &str) -> (User, String) {
    let user = storage
        .create_user(UserDraft::with_email(email))
        .await
        .expect("Failed to create user");
    let token = storage
        .issue_token(user.id)
        .await
        .expect("Failed to issue token");
    (user, token)
}

pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("Invalid token"),
    )
}

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 12, 0, 0).unwrap()
}

/// Values of `field` across a JSON array body.
pub fn field(body: &Value, field: &str) -> Vec<String> {
    body.as_array()
        .expect("Expected a JSON array")
        .iter()
        .map(|item| item[field].as_str().unwrap_or_default().to_string())
        .collect()
}

/// A response header as text.
pub fn header_str(response: &TestResponse, name: &str) -> String {
    response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Missing header {}", name))
        .to_str()
        .expect("Non-ASCII header")
        .to_string()
}

/// `(rel, path?query)` pairs of the `Link` header, in order.
///
/// Targets must be absolute URLs; the scheme and host are dropped since
/// they depend on the test transport.
pub fn links(response: &TestResponse) -> Vec<(String, String)> {
    header_str(response, "link")
        .split(", ")
        .map(|entry| {
            let (target, rel) = entry.split_once("; rel=").expect("Malformed link");
            let url = url::Url::parse(target.trim_start_matches('<').trim_end_matches('>'))
                .expect("Link target is not an absolute URL");
            let target = format!("{}?{}", url.path(), url.query().unwrap_or_default());
            (rel.to_string(), target)
        })
        .collect()
}
