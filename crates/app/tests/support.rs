//! Shared fixtures for HTTP route tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use leadflow_app::{router, AppContext};
use leadflow_domain::{Config, DatabaseConfig, GoogleConfig, ServerConfig, SyncConfig};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::MockServer;

pub const TEST_KEY: &str = "test_key_64_chars_long_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const USER: &str = "user-1";

/// Application wired against a throwaway database and a mock Google.
pub struct TestApp {
    pub ctx: Arc<AppContext>,
    pub router: Router,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn new(server: &MockServer) -> Self {
        Self::with_client_id(server, "client-123")
    }

    pub fn with_client_id(server: &MockServer, client_id: &str) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temporary directory");
        let config = Config {
            database: DatabaseConfig {
                path: temp_dir.path().join("leadflow.db").to_string_lossy().to_string(),
                pool_size: 4,
                encryption_key: Some(TEST_KEY.to_string()),
            },
            google: GoogleConfig {
                client_id: client_id.to_string(),
                client_secret: Some("secret-xyz".into()),
                redirect_uri: "http://localhost:5173/configuracoes".into(),
                auth_url: format!("{}/o/oauth2/v2/auth", server.uri()),
                token_url: format!("{}/token", server.uri()),
                userinfo_url: format!("{}/oauth2/v2/userinfo", server.uri()),
                calendar_api_base: format!("{}/calendar/v3", server.uri()),
            },
            sync: SyncConfig { enabled: false, ..SyncConfig::default() },
            server: ServerConfig::default(),
        };

        let ctx = Arc::new(AppContext::new(config).expect("failed to create app context"));
        let router = router(Arc::clone(&ctx));
        Self { ctx, router, _temp_dir: temp_dir }
    }

    /// Send a request as `user` (or anonymously) and decode the JSON body.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body should read");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };
        (status, json)
    }
}
