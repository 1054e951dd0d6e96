//! Meeting-lead status service
//!
//! UI actions move leads between `pending`, `linked` and `ignored`. The
//! ingestion pipeline never calls into this service.

use std::sync::Arc;

use leadflow_common::redact_identifier;
use leadflow_domain::{LeadflowError, MeetingLead, MeetingLeadStatus, Result};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::ingestion::ports::MeetingLeadRepository;

pub struct MeetingLeadService {
    leads: Arc<dyn MeetingLeadRepository>,
}

impl MeetingLeadService {
    pub fn new(leads: Arc<dyn MeetingLeadRepository>) -> Self {
        Self { leads }
    }

    /// Leads for the user ordered by event time.
    pub async fn list(&self, user_id: &str) -> Result<Vec<MeetingLead>> {
        self.leads.list_leads(user_id).await
    }

    /// Dismiss a pending lead.
    pub async fn mark_ignored(&self, user_id: &str, lead_id: Uuid) -> Result<MeetingLead> {
        self.transition(user_id, lead_id, MeetingLeadStatus::Ignored, None).await
    }

    /// Undo a dismissal.
    pub async fn mark_pending(&self, user_id: &str, lead_id: Uuid) -> Result<MeetingLead> {
        self.transition(user_id, lead_id, MeetingLeadStatus::Pending, None).await
    }

    /// Convert a pending lead into a proposal. Terminal.
    ///
    /// # Errors
    /// `InvalidInput` for a blank proposal id, plus the errors of any
    /// transition.
    pub async fn mark_linked(
        &self,
        user_id: &str,
        lead_id: Uuid,
        proposal_id: &str,
    ) -> Result<MeetingLead> {
        let proposal_id = proposal_id.trim();
        if proposal_id.is_empty() {
            return Err(LeadflowError::InvalidInput("proposal id is required".into()));
        }
        self.transition(user_id, lead_id, MeetingLeadStatus::Linked, Some(proposal_id)).await
    }

    /// # Errors
    /// `NotFound` for an unknown lead, `InvalidTransition` when the move is
    /// not allowed from the current status (including a concurrent change
    /// that lands first).
    #[instrument(skip(self, user_id, proposal_id), fields(user = %redact_identifier(user_id)))]
    async fn transition(
        &self,
        user_id: &str,
        lead_id: Uuid,
        next: MeetingLeadStatus,
        proposal_id: Option<&str>,
    ) -> Result<MeetingLead> {
        let current = self.require_lead(user_id, lead_id).await?.status;

        if !current.can_transition_to(next) {
            return Err(invalid_transition(current, next));
        }

        let applied =
            self.leads.update_status(user_id, lead_id, current, next, proposal_id).await?;
        let updated = self.require_lead(user_id, lead_id).await?;

        if !applied {
            return Err(invalid_transition(updated.status, next));
        }

        info!(from = %current, to = %next, "meeting lead status changed");
        Ok(updated)
    }

    async fn require_lead(&self, user_id: &str, lead_id: Uuid) -> Result<MeetingLead> {
        self.leads
            .get_lead(user_id, lead_id)
            .await?
            .ok_or_else(|| LeadflowError::NotFound(format!("meeting lead {lead_id}")))
    }
}

fn invalid_transition(from: MeetingLeadStatus, to: MeetingLeadStatus) -> LeadflowError {
    LeadflowError::InvalidTransition { from: from.to_string(), to: to.to_string() }
}
