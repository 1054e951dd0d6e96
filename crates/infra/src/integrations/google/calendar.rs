//! Google Calendar events client

use std::time::Duration;

use async_trait::async_trait;
use leadflow_core::CalendarSource;
use leadflow_domain::constants::{DEFAULT_CALENDAR_ID, SYNC_MAX_RESULTS};
use leadflow_domain::{LeadflowError, ProviderEvent, Result, SyncWindow};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::types::GoogleEventsResponse;
use crate::errors::InfraError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads the primary calendar of the token's owner.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    api_base: String,
}

impl GoogleCalendarClient {
    /// Create a client against `api_base` (normally
    /// `https://www.googleapis.com/calendar/v3`).
    ///
    /// # Errors
    /// Returns `Config` if the HTTP client cannot be constructed.
    pub fn new(api_base: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| LeadflowError::Config(format!("http client: {e}")))?;
        Ok(Self::with_http_client(api_base, client))
    }

    #[must_use]
    pub fn with_http_client(api_base: impl Into<String>, client: Client) -> Self {
        Self { client, api_base: api_base.into().trim_end_matches('/').to_string() }
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{DEFAULT_CALENDAR_ID}/events", self.api_base)
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    #[instrument(skip(self, access_token), fields(time_min = %window.start, time_max = %window.end))]
    async fn list_events(&self, access_token: &str, window: SyncWindow) -> Result<Vec<ProviderEvent>> {
        let query = [
            ("timeMin", window.start.to_rfc3339()),
            ("timeMax", window.end.to_rfc3339()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", SYNC_MAX_RESULTS.to_string()),
        ];

        let response = self
            .client
            .get(self.events_url())
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await
            .map_err(InfraError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown status").to_string());
            warn!(status = status.as_u16(), %message, "calendar fetch rejected");
            return Err(LeadflowError::CalendarFetch { status: status.as_u16(), message });
        }

        let page: GoogleEventsResponse = response
            .json()
            .await
            .map_err(|e| LeadflowError::Network(format!("Failed to parse Google response: {e}")))?;

        if page.next_page_token.is_some() {
            debug!(max_results = SYNC_MAX_RESULTS, "calendar window exceeds one page, remainder skipped");
        }

        let events: Vec<ProviderEvent> = page.items.into_iter().map(ProviderEvent::from).collect();
        debug!(events = events.len(), "calendar events fetched");
        Ok(events)
    }
}

/// `error.message` from a Google JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.pointer("/error/message").and_then(|m| m.as_str()).map(str::to_string)
}
