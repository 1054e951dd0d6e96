//! In-memory repository implementations for testing
//!
//! Each mock records the calls tests assert on, enabling deterministic
//! tests without database dependencies.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadflow_core::{CredentialRepository, MeetingLeadRepository, PendingAuthorizationStore};
use leadflow_domain::{
    CalendarCredential, CredentialGrant, MeetingLead, MeetingLeadStatus, NewMeetingLead,
    PendingAuthorization, Result as DomainResult, TokenGrant, UpsertOutcome,
};
use uuid::Uuid;

/// In-memory mock for `CredentialRepository`.
#[derive(Default, Clone)]
pub struct InMemoryCredentialRepository {
    records: Arc<Mutex<HashMap<String, CalendarCredential>>>,
    last_sync_writes: Arc<Mutex<Vec<DateTime<Utc>>>>,
}

impl InMemoryCredentialRepository {
    pub fn insert(&self, credential: CalendarCredential) {
        self.records.lock().unwrap().insert(credential.user_id.clone(), credential);
    }

    pub fn get(&self, user_id: &str) -> Option<CalendarCredential> {
        self.records.lock().unwrap().get(user_id).cloned()
    }

    pub fn last_sync_writes(&self) -> usize {
        self.last_sync_writes.lock().unwrap().len()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn find_by_user(&self, user_id: &str) -> DomainResult<Option<CalendarCredential>> {
        Ok(self.get(user_id))
    }

    async fn upsert_from_exchange(&self, grant: CredentialGrant) -> DomainResult<CalendarCredential> {
        let now = Utc::now();
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(grant.user_id.clone())
            .and_modify(|existing| {
                existing.access_token = grant.access_token.clone();
                if grant.refresh_token.is_some() {
                    existing.refresh_token = grant.refresh_token.clone();
                }
                existing.token_expiry = Some(grant.token_expiry);
                existing.provider_email = grant.provider_email.clone();
                existing.enabled = true;
                existing.updated_at = now;
            })
            .or_insert_with(|| CalendarCredential {
                user_id: grant.user_id.clone(),
                access_token: grant.access_token.clone(),
                refresh_token: grant.refresh_token.clone(),
                token_expiry: Some(grant.token_expiry),
                provider_email: grant.provider_email.clone(),
                enabled: true,
                last_sync: None,
                calendar_id: "primary".to_string(),
                created_at: now,
                updated_at: now,
            });
        Ok(record.clone())
    }

    async fn update_tokens(&self, user_id: &str, grant: &TokenGrant) -> DomainResult<()> {
        if let Some(record) = self.records.lock().unwrap().get_mut(user_id) {
            record.access_token = grant.access_token.clone();
            record.token_expiry = Some(grant.expires_at);
            if grant.refresh_token.is_some() {
                record.refresh_token = grant.refresh_token.clone();
            }
        }
        Ok(())
    }

    async fn set_enabled(&self, user_id: &str, enabled: bool) -> DomainResult<()> {
        if let Some(record) = self.records.lock().unwrap().get_mut(user_id) {
            record.enabled = enabled;
        }
        Ok(())
    }

    async fn touch_last_sync(&self, user_id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        if let Some(record) = self.records.lock().unwrap().get_mut(user_id) {
            record.last_sync = Some(at);
        }
        self.last_sync_writes.lock().unwrap().push(at);
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> DomainResult<bool> {
        Ok(self.records.lock().unwrap().remove(user_id).is_some())
    }

    async fn list_enabled_user_ids(&self) -> DomainResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.enabled)
            .map(|r| r.user_id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// In-memory mock for `MeetingLeadRepository`.
#[derive(Default, Clone)]
pub struct InMemoryLeadRepository {
    leads: Arc<Mutex<Vec<MeetingLead>>>,
}

impl InMemoryLeadRepository {
    pub fn all(&self) -> Vec<MeetingLead> {
        self.leads.lock().unwrap().clone()
    }

    /// Overwrite a lead's status directly, as a concurrent writer would.
    pub fn force_status(&self, lead_id: Uuid, status: MeetingLeadStatus) {
        if let Some(lead) = self.leads.lock().unwrap().iter_mut().find(|l| l.id == lead_id) {
            lead.status = status;
        }
    }
}

#[async_trait]
impl MeetingLeadRepository for InMemoryLeadRepository {
    async fn upsert_lead(&self, lead: NewMeetingLead) -> DomainResult<UpsertOutcome> {
        let now = Utc::now();
        let mut leads = self.leads.lock().unwrap();

        if let Some(existing) = leads.iter_mut().find(|l| {
            l.user_id == lead.user_id && l.provider_event_id == lead.provider_event_id
        }) {
            existing.enrichment = lead.enrichment;
            existing.updated_at = now;
            return Ok(UpsertOutcome::Updated(existing.id));
        }

        let id = Uuid::now_v7();
        leads.push(MeetingLead {
            id,
            user_id: lead.user_id,
            provider_event_id: lead.provider_event_id,
            title: lead.title,
            detected_client_name: lead.detected_client_name,
            event_timestamp: lead.event_timestamp,
            status: MeetingLeadStatus::Pending,
            enrichment: lead.enrichment,
            linked_proposal_id: None,
            created_at: now,
            updated_at: now,
        });
        Ok(UpsertOutcome::Inserted(id))
    }

    async fn list_leads(&self, user_id: &str) -> DomainResult<Vec<MeetingLead>> {
        let mut leads: Vec<MeetingLead> =
            self.leads.lock().unwrap().iter().filter(|l| l.user_id == user_id).cloned().collect();
        leads.sort_by_key(|l| l.event_timestamp);
        Ok(leads)
    }

    async fn get_lead(&self, user_id: &str, lead_id: Uuid) -> DomainResult<Option<MeetingLead>> {
        Ok(self
            .leads
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.user_id == user_id && l.id == lead_id)
            .cloned())
    }

    async fn update_status(
        &self,
        user_id: &str,
        lead_id: Uuid,
        expected: MeetingLeadStatus,
        next: MeetingLeadStatus,
        linked_proposal_id: Option<&str>,
    ) -> DomainResult<bool> {
        let mut leads = self.leads.lock().unwrap();
        let Some(lead) = leads
            .iter_mut()
            .find(|l| l.user_id == user_id && l.id == lead_id && l.status == expected)
        else {
            return Ok(false);
        };
        lead.status = next;
        if let Some(proposal) = linked_proposal_id {
            lead.linked_proposal_id = Some(proposal.to_string());
        }
        lead.updated_at = Utc::now();
        Ok(true)
    }
}

/// In-memory mock for `PendingAuthorizationStore`.
#[derive(Default, Clone)]
pub struct InMemoryPendingStore {
    slots: Arc<Mutex<HashMap<String, PendingAuthorization>>>,
}

impl InMemoryPendingStore {
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap().len()
    }

    pub fn peek(&self, state: &str) -> Option<PendingAuthorization> {
        self.slots.lock().unwrap().get(state).cloned()
    }
}

#[async_trait]
impl PendingAuthorizationStore for InMemoryPendingStore {
    async fn put(&self, state: &str, pending: PendingAuthorization) -> DomainResult<()> {
        self.slots.lock().unwrap().insert(state.to_string(), pending);
        Ok(())
    }

    async fn take(&self, state: &str) -> DomainResult<Option<PendingAuthorization>> {
        Ok(self.slots.lock().unwrap().remove(state))
    }
}
