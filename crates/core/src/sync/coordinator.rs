//! Sync coordinator
//!
//! Two entry points feed the ingestion pipeline: the periodic scheduler
//! (`request_sync`, guarded) and an explicit user request (`sync_now`,
//! always runs but counts as a trigger so the next tick in the same window
//! is suppressed).

use std::sync::Arc;

use chrono::Utc;
use leadflow_common::redact_identifier;
use leadflow_domain::{Result, SyncReport};
use tracing::{debug, instrument};

use super::guard::SyncGuard;
use crate::auth::ports::CredentialRepository;
use crate::ingestion::MeetingIngestionPipeline;

pub struct SyncCoordinator {
    pipeline: Arc<MeetingIngestionPipeline>,
    credentials: Arc<dyn CredentialRepository>,
    guard: SyncGuard,
}

impl SyncCoordinator {
    pub fn new(
        pipeline: Arc<MeetingIngestionPipeline>,
        credentials: Arc<dyn CredentialRepository>,
        guard: SyncGuard,
    ) -> Self {
        Self { pipeline, credentials, guard }
    }

    /// Run a sync if one is due.
    ///
    /// Returns `Ok(None)` without any network I/O when the user is not
    /// connected, needs to reconnect, or synced inside the guard window.
    #[instrument(skip(self, user_id), fields(user = %redact_identifier(user_id)))]
    pub async fn request_sync(&self, user_id: &str) -> Result<Option<SyncReport>> {
        let Some(credential) = self.credentials.find_by_user(user_id).await? else {
            return Ok(None);
        };
        if !credential.enabled {
            debug!("credential needs reconnect, not scheduling sync");
            return Ok(None);
        }

        if !self.guard.try_acquire(user_id, credential.last_sync, Utc::now()) {
            debug!("sync not due yet");
            return Ok(None);
        }

        self.pipeline.sync(user_id).await.map(Some)
    }

    /// Run a sync immediately on explicit request.
    pub async fn sync_now(&self, user_id: &str) -> Result<SyncReport> {
        self.guard.record(user_id, Utc::now());
        self.pipeline.sync(user_id).await
    }

    /// Clear local trigger state after a disconnect.
    pub fn forget(&self, user_id: &str) {
        self.guard.forget(user_id);
    }
}
