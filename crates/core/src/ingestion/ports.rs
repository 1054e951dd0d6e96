//! Port interfaces for the calendar source and the meeting-lead store

use async_trait::async_trait;
use leadflow_domain::{
    MeetingLead, MeetingLeadStatus, NewMeetingLead, ProviderEvent, Result, SyncWindow,
    UpsertOutcome,
};
use uuid::Uuid;

/// External calendar API.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Single-page fetch of event instances in `window`, ordered by start.
    ///
    /// A non-success response surfaces as `LeadflowError::CalendarFetch`
    /// carrying the HTTP status; transport failures as `Network`.
    async fn list_events(&self, access_token: &str, window: SyncWindow)
        -> Result<Vec<ProviderEvent>>;
}

/// Persistence for detected meetings.
#[async_trait]
pub trait MeetingLeadRepository: Send + Sync {
    /// Insert as `pending`, or refresh only the enrichment fields of the
    /// existing `(user_id, provider_event_id)` record. Title, client name,
    /// event time, status and linked proposal are left as stored.
    async fn upsert_lead(&self, lead: NewMeetingLead) -> Result<UpsertOutcome>;

    /// Leads for the user ordered by event time, oldest first.
    async fn list_leads(&self, user_id: &str) -> Result<Vec<MeetingLead>>;

    async fn get_lead(&self, user_id: &str, lead_id: Uuid) -> Result<Option<MeetingLead>>;

    /// Compare-and-set status change. Returns `false` when the record is
    /// missing or its status is no longer `expected`.
    async fn update_status(
        &self,
        user_id: &str,
        lead_id: Uuid,
        expected: MeetingLeadStatus,
        next: MeetingLeadStatus,
        linked_proposal_id: Option<&str>,
    ) -> Result<bool>;
}
