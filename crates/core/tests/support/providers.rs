//! Scripted identity-provider and calendar mocks
//!
//! Responses are configured up front; every call is recorded so tests can
//! assert on network activity (or its absence).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use leadflow_common::PKCEChallenge;
use leadflow_core::{CalendarSource, IdentityProvider};
use leadflow_domain::{LeadflowError, ProviderEvent, Result as DomainResult, SyncWindow, TokenGrant};

pub fn grant(access: &str, refresh: Option<&str>) -> TokenGrant {
    TokenGrant {
        access_token: access.to_string(),
        refresh_token: refresh.map(str::to_string),
        expires_at: Utc::now() + Duration::seconds(3600),
    }
}

/// Scripted `IdentityProvider`.
#[derive(Clone)]
pub struct MockIdentityProvider {
    exchange_result: Arc<Mutex<DomainResult<TokenGrant>>>,
    refresh_result: Arc<Mutex<DomainResult<TokenGrant>>>,
    email_result: Arc<Mutex<DomainResult<Option<String>>>>,
    client_configured: Arc<Mutex<bool>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self {
            exchange_result: Arc::new(Mutex::new(Ok(grant("exchanged-access", Some("exchanged-refresh"))))),
            refresh_result: Arc::new(Mutex::new(Ok(grant("refreshed-access", None)))),
            email_result: Arc::new(Mutex::new(Ok(Some("ana@example.com".to_string())))),
            client_configured: Arc::new(Mutex::new(true)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockIdentityProvider {
    pub fn set_exchange_result(&self, result: DomainResult<TokenGrant>) {
        *self.exchange_result.lock().unwrap() = result;
    }

    pub fn set_refresh_result(&self, result: DomainResult<TokenGrant>) {
        *self.refresh_result.lock().unwrap() = result;
    }

    pub fn set_email_result(&self, result: DomainResult<Option<String>>) {
        *self.email_result.lock().unwrap() = result;
    }

    pub fn set_client_configured(&self, configured: bool) {
        *self.client_configured.lock().unwrap() = configured;
    }

    /// Recorded calls, e.g. `"exchange:code-1:verifier:http://cb"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn default_redirect_uri(&self) -> String {
        "http://localhost:8787/callback".to_string()
    }

    fn authorization_url(&self, challenge: &PKCEChallenge, redirect_uri: &str) -> DomainResult<String> {
        if !*self.client_configured.lock().unwrap() {
            return Err(LeadflowError::Config("client id is not configured".into()));
        }
        Ok(format!(
            "https://idp.example.com/auth?redirect_uri={redirect_uri}&state={}&code_challenge={}&access_type=offline&prompt=consent",
            challenge.state, challenge.code_challenge
        ))
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> DomainResult<TokenGrant> {
        self.record(format!("exchange:{code}:{code_verifier}:{redirect_uri}"));
        self.exchange_result.lock().unwrap().clone()
    }

    async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenGrant> {
        self.record(format!("refresh:{refresh_token}"));
        self.refresh_result.lock().unwrap().clone()
    }

    async fn fetch_user_email(&self, access_token: &str) -> DomainResult<Option<String>> {
        self.record(format!("userinfo:{access_token}"));
        self.email_result.lock().unwrap().clone()
    }
}

/// Scripted `CalendarSource`.
#[derive(Clone)]
pub struct MockCalendarSource {
    result: Arc<Mutex<DomainResult<Vec<ProviderEvent>>>>,
    tokens_used: Arc<Mutex<Vec<String>>>,
}

impl Default for MockCalendarSource {
    fn default() -> Self {
        Self { result: Arc::new(Mutex::new(Ok(Vec::new()))), tokens_used: Arc::new(Mutex::new(Vec::new())) }
    }
}

impl MockCalendarSource {
    pub fn set_events(&self, events: Vec<ProviderEvent>) {
        *self.result.lock().unwrap() = Ok(events);
    }

    pub fn set_error(&self, error: LeadflowError) {
        *self.result.lock().unwrap() = Err(error);
    }

    pub fn fetch_count(&self) -> usize {
        self.tokens_used.lock().unwrap().len()
    }

    pub fn tokens_used(&self) -> Vec<String> {
        self.tokens_used.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarSource for MockCalendarSource {
    async fn list_events(
        &self,
        access_token: &str,
        _window: SyncWindow,
    ) -> DomainResult<Vec<ProviderEvent>> {
        self.tokens_used.lock().unwrap().push(access_token.to_string());
        self.result.lock().unwrap().clone()
    }
}
