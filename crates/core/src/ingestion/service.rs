//! Meeting ingestion pipeline - fetch, classify, enrich, upsert

use std::sync::Arc;

use chrono::Utc;
use leadflow_common::redact_identifier;
use leadflow_domain::constants::{
    DESCRIPTION_TRUNCATE_SUFFIX, MAX_DESCRIPTION_CHARS, SYNC_LOOKAHEAD_DAYS, SYNC_LOOKBACK_DAYS,
};
use leadflow_domain::utils::text::{strip_html, truncate_chars};
use leadflow_domain::{
    classify_event_title, LeadflowError, MeetingEnrichment, NewMeetingLead, ProviderEvent, Result,
    SyncReport, SyncWindow,
};
use tracing::{debug, info, instrument, warn};

use super::ports::{CalendarSource, MeetingLeadRepository};
use crate::auth::ports::CredentialRepository;
use crate::auth::TokenLifecycleManager;

/// Drives one sync run for a user: credential check, token freshness,
/// calendar fetch, title classification, enrichment and idempotent upsert.
pub struct MeetingIngestionPipeline {
    credentials: Arc<dyn CredentialRepository>,
    tokens: Arc<TokenLifecycleManager>,
    calendar: Arc<dyn CalendarSource>,
    leads: Arc<dyn MeetingLeadRepository>,
    lookback_days: i64,
    lookahead_days: i64,
}

impl MeetingIngestionPipeline {
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        tokens: Arc<TokenLifecycleManager>,
        calendar: Arc<dyn CalendarSource>,
        leads: Arc<dyn MeetingLeadRepository>,
    ) -> Self {
        Self {
            credentials,
            tokens,
            calendar,
            leads,
            lookback_days: SYNC_LOOKBACK_DAYS,
            lookahead_days: SYNC_LOOKAHEAD_DAYS,
        }
    }

    /// Sync the user's calendar into the meeting-lead store.
    ///
    /// `last_sync` is stamped on every run that reaches the end, including
    /// runs that find nothing new.
    ///
    /// # Errors
    /// - `NotConnected` when the user has no credential
    /// - `TokenExpired` when the credential is disabled (no network I/O),
    ///   cannot be refreshed, or the calendar answers 401 (the credential is
    ///   disabled first)
    /// - `CalendarFetch` for any other calendar failure, credential untouched
    /// - `Store` when persistence fails
    #[instrument(skip(self, user_id), fields(user = %redact_identifier(user_id)))]
    pub async fn sync(&self, user_id: &str) -> Result<SyncReport> {
        let credential =
            self.credentials.find_by_user(user_id).await?.ok_or(LeadflowError::NotConnected)?;

        if !credential.enabled {
            debug!("credential disabled, skipping network calls");
            return Err(LeadflowError::TokenExpired);
        }

        let access_token = self.tokens.ensure_fresh_token(&credential).await?;

        let window = SyncWindow::around(Utc::now(), self.lookback_days, self.lookahead_days);
        let events = match self.calendar.list_events(&access_token, window).await {
            Ok(events) => events,
            Err(err) if err.is_calendar_unauthorized() => {
                warn!("calendar rejected access token, disabling credential");
                self.credentials.set_enabled(user_id, false).await?;
                return Err(LeadflowError::TokenExpired);
            }
            Err(err) => {
                warn!(error = %err, "calendar fetch failed");
                return Err(err);
            }
        };

        let mut report = SyncReport { events_fetched: events.len(), ..SyncReport::default() };

        for event in &events {
            let Some(lead) = build_meeting_lead(user_id, event) else {
                report.events_skipped += 1;
                continue;
            };

            if self.leads.upsert_lead(lead).await?.is_inserted() {
                report.new_event_count += 1;
            } else {
                report.updated_event_count += 1;
            }
        }

        self.credentials.touch_last_sync(user_id, Utc::now()).await?;

        info!(
            events_fetched = report.events_fetched,
            new_events = report.new_event_count,
            updated_events = report.updated_event_count,
            "calendar sync completed"
        );
        Ok(report)
    }
}

/// Turn a calendar event into a lead candidate.
///
/// Returns `None` for cancelled events, events without a title or start
/// time, and titles that do not classify as a client meeting.
#[must_use]
pub fn build_meeting_lead(user_id: &str, event: &ProviderEvent) -> Option<NewMeetingLead> {
    if event.is_cancelled() {
        return None;
    }
    let title = event.title()?;
    let start = event.start?;

    let classification = classify_event_title(title);
    if !classification.is_lead() {
        return None;
    }

    Some(NewMeetingLead {
        user_id: user_id.to_string(),
        provider_event_id: event.id.clone(),
        title: event.summary.clone().unwrap_or_else(|| title.to_string()),
        detected_client_name: classification.client_name,
        event_timestamp: start.to_utc(),
        enrichment: enrich(event),
    })
}

fn enrich(event: &ProviderEvent) -> MeetingEnrichment {
    let description = event
        .description
        .as_deref()
        .map(strip_html)
        .filter(|text| !text.is_empty())
        .map(|text| truncate_chars(&text, MAX_DESCRIPTION_CHARS, DESCRIPTION_TRUNCATE_SUFFIX));

    MeetingEnrichment {
        description,
        attendees: event
            .attendees
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect(),
        location: event
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string),
        conference_link: event.conference_link(),
        duration_minutes: event.duration_minutes(),
    }
}
