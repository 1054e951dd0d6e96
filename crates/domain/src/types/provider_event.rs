//! Calendar provider boundary types
//!
//! The calendar adapter translates the provider's loosely typed JSON into
//! these structs; nothing past the adapter inspects raw provider payloads.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Start or end of an event: a precise instant, or an all-day date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl EventTime {
    /// Instant for ordering and storage; all-day dates map to midnight UTC.
    #[must_use]
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            Self::DateTime(dt) => *dt,
            Self::Date(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }

    #[must_use]
    pub const fn has_time_of_day(&self) -> bool {
        matches!(self, Self::DateTime(_))
    }
}

/// A single calendar event instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderEvent {
    pub id: String,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub attendees: Vec<String>,
    pub location: Option<String>,
    /// Raw description, may contain HTML.
    pub description: Option<String>,
    pub hangout_link: Option<String>,
    /// URIs of conference entry points whose type is "video", in provider order.
    pub video_entry_points: Vec<String>,
}

impl ProviderEvent {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("cancelled"))
    }

    /// Non-blank title, trimmed.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.summary.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Explicit hangout link first, else the first video entry point.
    #[must_use]
    pub fn conference_link(&self) -> Option<String> {
        self.hangout_link
            .as_deref()
            .filter(|link| !link.trim().is_empty())
            .or_else(|| self.video_entry_points.first().map(String::as_str))
            .map(str::to_string)
    }

    /// Duration in whole minutes, only when both ends carry a time of day.
    #[must_use]
    pub fn duration_minutes(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(EventTime::DateTime(start)), Some(EventTime::DateTime(end))) if end >= start => {
                Some((end - start).num_minutes())
            }
            _ => None,
        }
    }
}

/// Time window requested from the calendar provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SyncWindow {
    #[must_use]
    pub fn around(now: DateTime<Utc>, lookback_days: i64, lookahead_days: i64) -> Self {
        Self { start: now - Duration::days(lookback_days), end: now + Duration::days(lookahead_days) }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32, minute: u32) -> EventTime {
        EventTime::DateTime(Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap())
    }

    #[test]
    fn all_day_dates_map_to_midnight_utc() {
        let date = EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(date.to_utc(), Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap());
        assert!(!date.has_time_of_day());
    }

    #[test]
    fn duration_requires_time_of_day_on_both_ends() {
        let timed = ProviderEvent { start: Some(at(14, 0)), end: Some(at(15, 30)), ..Default::default() };
        assert_eq!(timed.duration_minutes(), Some(90));

        let all_day = ProviderEvent {
            start: Some(EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())),
            end: Some(at(15, 30)),
            ..Default::default()
        };
        assert_eq!(all_day.duration_minutes(), None);
    }

    #[test]
    fn hangout_link_preferred_over_entry_points() {
        let mut event = ProviderEvent {
            hangout_link: Some("https://meet.google.com/abc-defg-hij".into()),
            video_entry_points: vec!["https://zoom.us/j/1".into(), "https://zoom.us/j/2".into()],
            ..Default::default()
        };
        assert_eq!(event.conference_link().as_deref(), Some("https://meet.google.com/abc-defg-hij"));

        event.hangout_link = None;
        assert_eq!(event.conference_link().as_deref(), Some("https://zoom.us/j/1"));
    }

    #[test]
    fn blank_titles_and_cancelled_status_detected() {
        let event = ProviderEvent {
            summary: Some("   ".into()),
            status: Some("CANCELLED".into()),
            ..Default::default()
        };
        assert_eq!(event.title(), None);
        assert!(event.is_cancelled());
    }
}
