//! Meeting-lead records and their status lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_domain_status_conversions;

/// Status of a detected meeting.
///
/// `Pending -> Linked` and `Pending <-> Ignored` are the only legal moves;
/// `Linked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingLeadStatus {
    Pending,
    Linked,
    Ignored,
}

impl_domain_status_conversions!(MeetingLeadStatus {
    Pending => "pending",
    Linked => "linked",
    Ignored => "ignored",
});

impl MeetingLeadStatus {
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Linked | Self::Ignored) | (Self::Ignored, Self::Pending)
        )
    }
}

/// Secondary event metadata, refreshed on every sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingEnrichment {
    pub description: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
    pub location: Option<String>,
    pub conference_link: Option<String>,
    pub duration_minutes: Option<i64>,
}

/// Lead candidate produced by the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeetingLead {
    pub user_id: String,
    pub provider_event_id: String,
    pub title: String,
    pub detected_client_name: Option<String>,
    pub event_timestamp: DateTime<Utc>,
    pub enrichment: MeetingEnrichment,
}

/// Persisted meeting lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingLead {
    pub id: Uuid,
    pub user_id: String,
    pub provider_event_id: String,
    pub title: String,
    pub detected_client_name: Option<String>,
    pub event_timestamp: DateTime<Utc>,
    pub status: MeetingLeadStatus,
    #[serde(flatten)]
    pub enrichment: MeetingEnrichment,
    pub linked_proposal_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whether an upsert created a new lead or refreshed an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(Uuid),
    Updated(Uuid),
}

impl UpsertOutcome {
    #[must_use]
    pub const fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::Inserted(id) | Self::Updated(id) => *id,
        }
    }
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub new_event_count: usize,
    pub updated_event_count: usize,
    pub events_fetched: usize,
    pub events_skipped: usize,
}
