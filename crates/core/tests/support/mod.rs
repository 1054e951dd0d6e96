//! Shared test helpers for `leadflow-core` integration tests.
//!
//! In-memory port implementations plus a [`Harness`] wiring them into the
//! real services, so each test can focus on behaviour instead of
//! boilerplate.

#![allow(dead_code)]

pub mod providers;
pub mod repositories;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use leadflow_core::{
    MeetingIngestionPipeline, MeetingLeadService, SyncCoordinator, SyncGuard,
    TokenLifecycleManager,
};
use leadflow_domain::{CalendarCredential, EventTime, ProviderEvent};

pub use providers::{MockCalendarSource, MockIdentityProvider};
pub use repositories::{InMemoryCredentialRepository, InMemoryLeadRepository, InMemoryPendingStore};

pub const USER: &str = "user-1";

/// Real services over in-memory ports.
pub struct Harness {
    pub credentials: Arc<InMemoryCredentialRepository>,
    pub leads: Arc<InMemoryLeadRepository>,
    pub pending: Arc<InMemoryPendingStore>,
    pub identity: Arc<MockIdentityProvider>,
    pub calendar: Arc<MockCalendarSource>,
    pub tokens: Arc<TokenLifecycleManager>,
    pub pipeline: Arc<MeetingIngestionPipeline>,
}

impl Harness {
    pub fn new() -> Self {
        let credentials = Arc::new(InMemoryCredentialRepository::default());
        let leads = Arc::new(InMemoryLeadRepository::default());
        let pending = Arc::new(InMemoryPendingStore::default());
        let identity = Arc::new(MockIdentityProvider::default());
        let calendar = Arc::new(MockCalendarSource::default());

        let tokens = Arc::new(TokenLifecycleManager::new(
            credentials.clone(),
            identity.clone(),
            pending.clone(),
        ));
        let pipeline = Arc::new(MeetingIngestionPipeline::new(
            credentials.clone(),
            tokens.clone(),
            calendar.clone(),
            leads.clone(),
        ));

        Self { credentials, leads, pending, identity, calendar, tokens, pipeline }
    }

    pub fn coordinator(&self, interval_secs: u64) -> SyncCoordinator {
        SyncCoordinator::new(
            self.pipeline.clone(),
            self.credentials.clone(),
            SyncGuard::new(interval_secs),
        )
    }

    pub fn lead_service(&self) -> MeetingLeadService {
        MeetingLeadService::new(self.leads.clone())
    }
}

/// Enabled credential whose token expires `expires_in` from now.
pub fn credential(expires_in: Duration, refresh_token: Option<&str>) -> CalendarCredential {
    let now = Utc::now();
    CalendarCredential {
        user_id: USER.to_string(),
        access_token: "stored-access".to_string(),
        refresh_token: refresh_token.map(str::to_string),
        token_expiry: Some(now + expires_in),
        provider_email: Some("ana@example.com".to_string()),
        enabled: true,
        last_sync: None,
        calendar_id: "primary".to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// Timed calendar event starting tomorrow.
pub fn timed_event(id: &str, summary: &str) -> ProviderEvent {
    let start: DateTime<Utc> = Utc::now() + Duration::days(1);
    ProviderEvent {
        id: id.to_string(),
        summary: Some(summary.to_string()),
        status: Some("confirmed".to_string()),
        start: Some(EventTime::DateTime(start)),
        end: Some(EventTime::DateTime(start + Duration::minutes(60))),
        ..ProviderEvent::default()
    }
}
