//! Periodic calendar sync scheduler.
//!
//! A cron job ticks (every minute by default), walks every enabled
//! credential and asks the [`SyncCoordinator`] for a sync. The coordinator's
//! guard decides whether a user is actually due, so the tick rate only bounds
//! how late a sync can start. On `start()` one activation pass runs right
//! away so a freshly started process does not wait for the first tick.
//!
//! Join handles are tracked, cancellation is explicit, and every
//! asynchronous operation is wrapped in a timeout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use leadflow_core::{CredentialRepository, SyncCoordinator};
//! use leadflow_infra::scheduling::{
//!     CalendarSyncScheduler, CalendarSyncSchedulerConfig, SchedulerResult,
//! };
//!
//! # async fn example(
//! #     coordinator: Arc<SyncCoordinator>,
//! #     credentials: Arc<dyn CredentialRepository>,
//! # ) -> SchedulerResult<()> {
//! let mut scheduler = CalendarSyncScheduler::new(
//!     CalendarSyncSchedulerConfig::default(),
//!     coordinator,
//!     credentials,
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use leadflow_common::redact_identifier;
use leadflow_core::{CredentialRepository, SyncCoordinator};
use leadflow_domain::constants::DEFAULT_SYNC_TICK_CRON;
use leadflow_domain::{LeadflowError, SyncConfig};
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the calendar sync scheduler.
#[derive(Debug, Clone)]
pub struct CalendarSyncSchedulerConfig {
    /// Cron expression (with seconds) describing the tick schedule.
    pub cron_expression: String,
    /// Run one pass immediately on start.
    pub run_on_start: bool,
    /// Timeout applied to a single pass over all users.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting spawned task join handles.
    pub join_timeout: Duration,
}

impl Default for CalendarSyncSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: DEFAULT_SYNC_TICK_CRON.into(),
            run_on_start: true,
            job_timeout: Duration::from_secs(300),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&SyncConfig> for CalendarSyncSchedulerConfig {
    fn from(config: &SyncConfig) -> Self {
        Self { cron_expression: config.tick_cron.clone(), ..Self::default() }
    }
}

/// Calendar sync scheduler with explicit lifecycle management.
pub struct CalendarSyncScheduler {
    scheduler: Option<JobScheduler>,
    config: CalendarSyncSchedulerConfig,
    activation_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    coordinator: Arc<SyncCoordinator>,
    credentials: Arc<dyn CredentialRepository>,
}

impl CalendarSyncScheduler {
    pub fn new(
        config: CalendarSyncSchedulerConfig,
        coordinator: Arc<SyncCoordinator>,
        credentials: Arc<dyn CredentialRepository>,
    ) -> Self {
        Self {
            scheduler: None,
            config,
            activation_handle: None,
            cancellation: CancellationToken::new(),
            coordinator,
            credentials,
        }
    }

    /// Start the scheduler and, if configured, the activation pass.
    ///
    /// # Errors
    /// `AlreadyRunning` on a second start; `JobRegistrationFailed` for an
    /// invalid cron expression; `Timeout` or `StartFailed` when the
    /// underlying scheduler does not come up.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: start_timeout.as_secs() })?
            .map_err(|e| SchedulerError::StartFailed(e.to_string()))?;

        self.scheduler = Some(scheduler_instance);

        if self.config.run_on_start {
            let cancel = self.cancellation.clone();
            let coordinator = Arc::clone(&self.coordinator);
            let credentials = Arc::clone(&self.credentials);
            let job_timeout = self.config.job_timeout;
            self.activation_handle = Some(tokio::spawn(async move {
                tokio::select! {
                    () = cancel.cancelled() => debug!("Activation pass cancelled"),
                    () = Self::timed_pass(coordinator, credentials, job_timeout) => {}
                }
            }));
        }

        info!(cron = %self.config.cron_expression, "Calendar sync scheduler started");
        Ok(())
    }

    /// Stop the scheduler and wait for the activation pass to finish.
    ///
    /// # Errors
    /// `NotRunning` when not started; `Timeout`, `StopFailed` or
    /// `TaskJoinFailed` when shutdown does not complete cleanly.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(mut scheduler) = self.scheduler.take() else {
            return Err(SchedulerError::NotRunning);
        };

        self.cancellation.cancel();

        let stop_timeout = self.config.stop_timeout;
        tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: stop_timeout.as_secs() })?
            .map_err(|e| SchedulerError::StopFailed(e.to_string()))?;

        if let Some(handle) = self.activation_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })?
                .map_err(|e| SchedulerError::TaskJoinFailed(e.to_string()))?;
        }

        info!("Calendar sync scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when a scheduler instance is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Run one pass over all enabled users now, outside the cron schedule.
    ///
    /// # Errors
    /// Returns the credential store error when the user list cannot be read.
    pub async fn run_once(&self) -> Result<SyncPassSummary, LeadflowError> {
        Self::perform_pass(&self.coordinator, self.credentials.as_ref()).await
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler =
            JobScheduler::new().await.map_err(|e| SchedulerError::CreationFailed(e.to_string()))?;
        let coordinator = Arc::clone(&self.coordinator);
        let credentials = Arc::clone(&self.credentials);
        let job_timeout = self.config.job_timeout;

        let job_definition = Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
            let coordinator = Arc::clone(&coordinator);
            let credentials = Arc::clone(&credentials);
            Box::pin(Self::timed_pass(coordinator, credentials, job_timeout))
        })
        .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        let job_id = job_definition.guid();
        scheduler
            .add(job_definition)
            .await
            .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        debug!(cron = %self.config.cron_expression, job_id = %job_id, "Registered calendar sync job");
        Ok(scheduler)
    }

    async fn timed_pass(
        coordinator: Arc<SyncCoordinator>,
        credentials: Arc<dyn CredentialRepository>,
        job_timeout: Duration,
    ) {
        let started = Instant::now();
        match tokio::time::timeout(job_timeout, Self::perform_pass(&coordinator, credentials.as_ref()))
            .await
        {
            Ok(Ok(summary)) if summary.failed > 0 => {
                warn!(%summary, elapsed = ?started.elapsed(), "Calendar sync pass had failures");
            }
            Ok(Ok(summary)) => {
                debug!(%summary, elapsed = ?started.elapsed(), "Calendar sync pass finished");
            }
            Ok(Err(err)) => {
                error!(error = %err, code = err.code(), "Calendar sync pass could not list users");
            }
            Err(_) => {
                warn!(timeout_secs = job_timeout.as_secs(), "Calendar sync pass timed out");
            }
        }
    }

    async fn perform_pass(
        coordinator: &SyncCoordinator,
        credentials: &dyn CredentialRepository,
    ) -> Result<SyncPassSummary, LeadflowError> {
        let user_ids = credentials.list_enabled_user_ids().await?;
        let mut summary = SyncPassSummary { users: user_ids.len(), ..SyncPassSummary::default() };

        for user_id in &user_ids {
            let user_tag = redact_identifier(user_id);
            match coordinator.request_sync(user_id).await {
                Ok(Some(report)) => {
                    summary.synced += 1;
                    summary.new_events += report.new_event_count;
                    debug!(user = %user_tag, new_events = report.new_event_count, "User synced");
                }
                Ok(None) => summary.skipped += 1,
                Err(err) if err.requires_reconnect() => {
                    summary.failed += 1;
                    info!(user = %user_tag, code = err.code(), "Credential needs reconnect");
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(user = %user_tag, code = err.code(), error = %err, "User sync failed");
                }
            }
        }

        if summary.users > 0 {
            info!(
                users = summary.users,
                synced = summary.synced,
                skipped = summary.skipped,
                failed = summary.failed,
                new_events = summary.new_events,
                "Calendar sync pass completed"
            );
        }
        Ok(summary)
    }
}

/// Outcome of one pass over all enabled users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncPassSummary {
    pub users: usize,
    pub synced: usize,
    /// Users not yet due.
    pub skipped: usize,
    pub failed: usize,
    pub new_events: usize,
}

impl fmt::Display for SyncPassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} users: {} synced, {} skipped, {} failed, {} new events",
            self.users, self.synced, self.skipped, self.failed, self.new_events
        )
    }
}

impl Drop for CalendarSyncScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("CalendarSyncScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
