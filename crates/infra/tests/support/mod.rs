//! Shared fixtures for `leadflow-infra` integration tests.
//!
//! A throwaway SQLCipher database plus a wiremock server standing in for
//! Google's token, user-info and calendar endpoints.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use leadflow_core::{
    CredentialRepository, MeetingIngestionPipeline, MeetingLeadService, SyncCoordinator,
    SyncGuard, TokenLifecycleManager,
};
use leadflow_domain::{CredentialGrant, GoogleConfig};
use leadflow_infra::{
    DbManager, GoogleCalendarClient, GoogleIdentityProvider, MokaPendingAuthorizationStore,
    SqlCipherCredentialRepository, SqlCipherMeetingLeadRepository,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_DB_KEY: &str = "test_key_64_chars_long_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const USER: &str = "user-1";
pub const EVENTS_PATH: &str = "/calendar/v3/calendars/primary/events";

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("leadflow-test.db");

        let manager =
            DbManager::new(&db_path, 4, Some(TEST_DB_KEY)).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }
}

/// Google settings pointing every endpoint at the mock server.
pub fn google_config(server: &MockServer) -> GoogleConfig {
    GoogleConfig {
        client_id: "client-123".into(),
        client_secret: Some("secret-xyz".into()),
        redirect_uri: "http://localhost:8787/integrations/google/callback".into(),
        auth_url: format!("{}/o/oauth2/v2/auth", server.uri()),
        token_url: format!("{}/token", server.uri()),
        userinfo_url: format!("{}/oauth2/v2/userinfo", server.uri()),
        calendar_api_base: format!("{}/calendar/v3", server.uri()),
    }
}

/// Real services over SQLCipher repositories and Google adapters.
pub struct Stack {
    pub db: TestDatabase,
    pub credentials: Arc<SqlCipherCredentialRepository>,
    pub leads: Arc<SqlCipherMeetingLeadRepository>,
    pub tokens: Arc<TokenLifecycleManager>,
    pub pipeline: Arc<MeetingIngestionPipeline>,
    pub coordinator: Arc<SyncCoordinator>,
    pub lead_service: MeetingLeadService,
}

impl Stack {
    pub fn new(server: &MockServer) -> Self {
        let db = TestDatabase::new();
        let config = google_config(server);

        let credentials = Arc::new(SqlCipherCredentialRepository::new(db.manager.clone()));
        let leads = Arc::new(SqlCipherMeetingLeadRepository::new(db.manager.clone()));
        let identity = Arc::new(GoogleIdentityProvider::new(&config).expect("identity provider"));
        let calendar =
            Arc::new(GoogleCalendarClient::new(config.calendar_api_base.clone()).expect("calendar"));
        let pending = Arc::new(MokaPendingAuthorizationStore::default());

        let tokens =
            Arc::new(TokenLifecycleManager::new(credentials.clone(), identity, pending));
        let pipeline = Arc::new(MeetingIngestionPipeline::new(
            credentials.clone(),
            tokens.clone(),
            calendar,
            leads.clone(),
        ));
        let coordinator = Arc::new(SyncCoordinator::new(
            pipeline.clone(),
            credentials.clone(),
            SyncGuard::new(300),
        ));
        let lead_service = MeetingLeadService::new(leads.clone());

        Self { db, credentials, leads, tokens, pipeline, coordinator, lead_service }
    }

    /// Store a connected credential whose token expires `expires_in` from now.
    pub async fn connect(&self, user_id: &str, expires_in: Duration, refresh: Option<&str>) {
        self.credentials
            .upsert_from_exchange(CredentialGrant {
                user_id: user_id.into(),
                access_token: "stored-access".into(),
                refresh_token: refresh.map(str::to_string),
                token_expiry: Utc::now() + expires_in,
                provider_email: Some("ana@example.com".into()),
            })
            .await
            .expect("credential stored");
    }
}

/// Google Calendar event JSON starting `days_ahead` days from now.
pub fn google_event(id: &str, summary: &str, days_ahead: i64) -> Value {
    let start = (Utc::now() + Duration::days(days_ahead)).date_naive().and_hms_opt(14, 0, 0);
    let start = start.expect("valid time").and_utc();
    let end = start + Duration::minutes(60);
    json!({
        "id": id,
        "status": "confirmed",
        "summary": summary,
        "start": {"dateTime": start.to_rfc3339()},
        "end": {"dateTime": end.to_rfc3339()},
        "attendees": [{"email": "ana@example.com"}],
        "hangoutLink": "https://meet.google.com/abc-defg-hij"
    })
}

pub async fn mount_events(server: &MockServer, items: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "calendar#events",
            "items": items
        })))
        .mount(server)
        .await;
}
