//! Integration tests for meeting-lead status transitions

mod support;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use leadflow_core::{MeetingLeadRepository, MeetingLeadService};
use leadflow_domain::{
    EventTime, LeadflowError, MeetingLead, MeetingLeadStatus, NewMeetingLead,
    Result as DomainResult, UpsertOutcome,
};
use support::{credential, timed_event, Harness, InMemoryLeadRepository, USER};
use uuid::Uuid;

async fn seeded() -> (Harness, Uuid) {
    let h = Harness::new();
    h.credentials.insert(credential(Duration::hours(1), Some("r")));
    h.calendar.set_events(vec![timed_event("evt-1", "Reunião Ana Silva")]);
    h.pipeline.sync(USER).await.unwrap();
    let id = h.leads.all()[0].id;
    (h, id)
}

#[tokio::test]
async fn ignore_then_restore() {
    let (h, id) = seeded().await;
    let service = h.lead_service();

    let ignored = service.mark_ignored(USER, id).await.unwrap();
    assert_eq!(ignored.status, MeetingLeadStatus::Ignored);

    let restored = service.mark_pending(USER, id).await.unwrap();
    assert_eq!(restored.status, MeetingLeadStatus::Pending);
}

/// Validates `linked` is terminal.
///
/// Assertions:
/// - Ensures linking records the proposal id.
/// - Ensures every move out of `linked` fails with `InvalidTransition`.
#[tokio::test]
async fn linked_is_terminal() {
    let (h, id) = seeded().await;
    let service = h.lead_service();

    let linked = service.mark_linked(USER, id, "proposal-1").await.unwrap();
    assert_eq!(linked.linked_proposal_id.as_deref(), Some("proposal-1"));

    assert_eq!(
        service.mark_pending(USER, id).await.unwrap_err(),
        LeadflowError::InvalidTransition { from: "linked".into(), to: "pending".into() }
    );
    assert_eq!(
        service.mark_ignored(USER, id).await.unwrap_err(),
        LeadflowError::InvalidTransition { from: "linked".into(), to: "ignored".into() }
    );
}

#[tokio::test]
async fn ignored_lead_cannot_be_linked() {
    let (h, id) = seeded().await;
    let service = h.lead_service();
    service.mark_ignored(USER, id).await.unwrap();

    let err = service.mark_linked(USER, id, "proposal-1").await.unwrap_err();

    assert_eq!(err, LeadflowError::InvalidTransition { from: "ignored".into(), to: "linked".into() });
}

#[tokio::test]
async fn blank_proposal_id_is_rejected() {
    let (h, id) = seeded().await;

    let err = h.lead_service().mark_linked(USER, id, "  ").await.unwrap_err();

    assert!(matches!(err, LeadflowError::InvalidInput(_)));
}

#[tokio::test]
async fn unknown_or_foreign_lead_is_not_found() {
    let (h, id) = seeded().await;
    let service = h.lead_service();

    assert!(matches!(service.mark_ignored(USER, Uuid::now_v7()).await, Err(LeadflowError::NotFound(_))));
    assert!(matches!(service.mark_ignored("intruder", id).await, Err(LeadflowError::NotFound(_))));
}

/// Repository that lets another writer link the lead right before every
/// status write.
struct RacingLeadRepository {
    inner: InMemoryLeadRepository,
}

#[async_trait]
impl MeetingLeadRepository for RacingLeadRepository {
    async fn upsert_lead(&self, lead: NewMeetingLead) -> DomainResult<UpsertOutcome> {
        self.inner.upsert_lead(lead).await
    }

    async fn list_leads(&self, user_id: &str) -> DomainResult<Vec<MeetingLead>> {
        self.inner.list_leads(user_id).await
    }

    async fn get_lead(&self, user_id: &str, lead_id: Uuid) -> DomainResult<Option<MeetingLead>> {
        self.inner.get_lead(user_id, lead_id).await
    }

    async fn update_status(
        &self,
        user_id: &str,
        lead_id: Uuid,
        expected: MeetingLeadStatus,
        next: MeetingLeadStatus,
        linked_proposal_id: Option<&str>,
    ) -> DomainResult<bool> {
        self.inner.force_status(lead_id, MeetingLeadStatus::Linked);
        self.inner.update_status(user_id, lead_id, expected, next, linked_proposal_id).await
    }
}

/// Validates the compare-and-set guards against a concurrent status change.
///
/// Assertions:
/// - Ensures the write fails with `InvalidTransition` from the new status.
/// - Ensures the concurrent status is not overwritten.
#[tokio::test]
async fn concurrent_change_is_not_overwritten() {
    let (h, id) = seeded().await;
    let service = MeetingLeadService::new(Arc::new(RacingLeadRepository { inner: (*h.leads).clone() }));

    let err = service.mark_ignored(USER, id).await.unwrap_err();

    assert_eq!(err, LeadflowError::InvalidTransition { from: "linked".into(), to: "ignored".into() });
    assert_eq!(h.leads.all()[0].status, MeetingLeadStatus::Linked);
}

#[tokio::test]
async fn list_is_ordered_by_event_time() {
    let h = Harness::new();
    h.credentials.insert(credential(Duration::hours(1), Some("r")));
    let mut later = timed_event("evt-later", "Reunião Zeta");
    later.start = Some(EventTime::DateTime(Utc::now() + Duration::days(5)));
    h.calendar.set_events(vec![later, timed_event("evt-sooner", "Reunião Alfa")]);
    h.pipeline.sync(USER).await.unwrap();

    let leads = h.lead_service().list(USER).await.unwrap();

    let ids: Vec<_> = leads.iter().map(|l| l.provider_event_id.as_str()).collect();
    assert_eq!(ids, vec!["evt-sooner", "evt-later"]);
}
