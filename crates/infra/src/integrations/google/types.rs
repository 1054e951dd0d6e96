//! Google Calendar wire types
//!
//! Only the fields the ingestion pipeline reads are modelled; everything
//! else in the payload is ignored.

use chrono::{DateTime, NaiveDate, Utc};
use leadflow_domain::{EventTime, ProviderEvent};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleEventsResponse {
    #[serde(default)]
    pub items: Vec<GoogleCalendarEvent>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GoogleCalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub hangout_link: Option<String>,
    pub start: Option<EventDateTime>,
    pub end: Option<EventDateTime>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    pub conference_data: Option<ConferenceData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventDateTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Attendee {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConferenceData {
    #[serde(default)]
    pub entry_points: Vec<EntryPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntryPoint {
    pub entry_point_type: Option<String>,
    pub uri: Option<String>,
}

impl EventDateTime {
    /// `dateTime` wins over `date`; unparseable values are dropped.
    fn parse(&self, event_id: &str) -> Option<EventTime> {
        if let Some(raw) = self.date_time.as_deref() {
            match DateTime::parse_from_rfc3339(raw) {
                Ok(dt) => return Some(EventTime::DateTime(dt.with_timezone(&Utc))),
                Err(e) => warn!(event_id, raw, error = %e, "unparseable event dateTime"),
            }
        }
        let raw = self.date.as_deref()?;
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(EventTime::Date(date)),
            Err(e) => {
                warn!(event_id, raw, error = %e, "unparseable event date");
                None
            }
        }
    }
}

impl From<GoogleCalendarEvent> for ProviderEvent {
    fn from(event: GoogleCalendarEvent) -> Self {
        let start = event.start.as_ref().and_then(|t| t.parse(&event.id));
        let end = event.end.as_ref().and_then(|t| t.parse(&event.id));

        let attendees = event
            .attendees
            .into_iter()
            .filter_map(|a| a.email)
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .collect();

        let video_entry_points = event
            .conference_data
            .map(|data| {
                data.entry_points
                    .into_iter()
                    .filter(|ep| ep.entry_point_type.as_deref() == Some("video"))
                    .filter_map(|ep| ep.uri)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: event.id,
            summary: event.summary,
            status: event.status,
            start,
            end,
            attendees,
            location: event.location,
            description: event.description,
            hangout_link: event.hangout_link,
            video_entry_points,
        }
    }
}
