#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::Duration;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use pitwall::auth::JwtKeys;
use pitwall::etl::load_all;
use pitwall::server::{AppState, create_router};
use pitwall::store::{SqliteStore, Store};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "correct horse battery";

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct TestApp {
    pub temp_dir: TempDir,
    pub state: Arc<AppState>,
    pub store: Option<Arc<SqliteStore>>,
    router: Router,
}

impl TestApp {
    /// An app over a source database loaded from the CSV fixtures.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = SqliteStore::new(temp_dir.path().join("f1.db")).expect("open store");
        store.initialize().expect("initialize schema");

        let summary = load_all(&store.connection(), fixtures_dir());
        assert!(
            summary.skipped.is_empty(),
            "fixture load skipped files: {:?}",
            summary.skipped
        );

        let store = Arc::new(store);
        Self::build(temp_dir, Some(store))
    }

    /// An app whose database could not be opened at startup.
    pub fn without_database() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        Self::build(temp_dir, None)
    }

    fn build(temp_dir: TempDir, store: Option<Arc<SqliteStore>>) -> Self {
        let jwt = JwtKeys::new(TEST_SECRET, Duration::minutes(30));
        let dyn_store = store.clone().map(|s| s as Arc<dyn Store>);
        let state = Arc::new(AppState::new(dyn_store, jwt));
        let router = create_router(state.clone());

        Self {
            temp_dir,
            state,
            store,
            router,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).expect("build request"))
            .await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(
            builder
                .body(Body::from(body.to_string()))
                .expect("build request"),
        )
        .await
    }

    pub async fn post_form(&self, uri: &str, form: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("build request");
        self.send(request).await
    }

    pub async fn signup(&self, username: &str) -> TestResponse {
        self.post_json(
            "/users",
            None,
            serde_json::json!({
                "username": username,
                "password": TEST_PASSWORD,
                "email": format!("{username}@example.com"),
            }),
        )
        .await
    }

    /// Registers `username` and returns a bearer token for it.
    pub async fn login_as(&self, username: &str) -> String {
        let resp = self.signup(username).await;
        assert_eq!(resp.status, StatusCode::OK, "signup failed: {}", resp.body);

        let resp = self
            .post_form(
                "/token",
                &format!("username={username}&password=correct+horse+battery"),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "login failed: {}", resp.body);

        resp.body["access_token"]
            .as_str()
            .expect("access token")
            .to_string()
    }
}
