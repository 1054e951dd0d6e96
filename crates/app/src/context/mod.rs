//! Application context - dependency injection container

use std::path::Path;
use std::sync::Arc;

use leadflow_core::{
    CredentialRepository, MeetingIngestionPipeline, MeetingLeadService, SyncCoordinator,
    SyncGuard, TokenLifecycleManager,
};
use leadflow_domain::{Config, LeadflowError, Result};
use leadflow_infra::{
    CalendarSyncScheduler, CalendarSyncSchedulerConfig, DbManager, GoogleCalendarClient,
    GoogleIdentityProvider, MokaPendingAuthorizationStore, SqlCipherCredentialRepository,
    SqlCipherMeetingLeadRepository,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub tokens: Arc<TokenLifecycleManager>,
    pub coordinator: Arc<SyncCoordinator>,
    pub leads: Arc<MeetingLeadService>,
    scheduler: Mutex<CalendarSyncScheduler>,
}

impl AppContext {
    /// Open the database, apply the schema and wire every service.
    ///
    /// The background scheduler is built but not started; call
    /// [`Self::start_background_sync`] once the runtime is up.
    ///
    /// # Errors
    /// `Config` for a missing encryption key or an unusable HTTP client,
    /// `Store` when the database cannot be opened or migrated.
    pub fn new(config: Config) -> Result<Self> {
        ensure_parent_dir(Path::new(&config.database.path))?;

        let db = Arc::new(DbManager::new(
            &config.database.path,
            config.database.pool_size,
            config.database.encryption_key.as_deref(),
        )?);
        db.run_migrations()?;

        let credentials: Arc<dyn CredentialRepository> =
            Arc::new(SqlCipherCredentialRepository::new(Arc::clone(&db)));
        let lead_store = Arc::new(SqlCipherMeetingLeadRepository::new(Arc::clone(&db)));

        let identity = Arc::new(GoogleIdentityProvider::new(&config.google)?);
        let calendar = Arc::new(GoogleCalendarClient::new(config.google.calendar_api_base.clone())?);
        let pending = Arc::new(MokaPendingAuthorizationStore::default());

        let tokens =
            Arc::new(TokenLifecycleManager::new(Arc::clone(&credentials), identity, pending));
        let pipeline = Arc::new(MeetingIngestionPipeline::new(
            Arc::clone(&credentials),
            Arc::clone(&tokens),
            calendar,
            lead_store.clone(),
        ));
        let coordinator = Arc::new(SyncCoordinator::new(
            pipeline,
            Arc::clone(&credentials),
            SyncGuard::new(config.sync.interval_seconds),
        ));
        let leads = Arc::new(MeetingLeadService::new(lead_store));

        let scheduler = CalendarSyncScheduler::new(
            CalendarSyncSchedulerConfig::from(&config.sync),
            Arc::clone(&coordinator),
            credentials,
        );

        if config.google.client_id.is_empty() {
            warn!("GOOGLE_CLIENT_ID is empty, authorization requests will fail");
        }

        Ok(Self { config, db, tokens, coordinator, leads, scheduler: Mutex::new(scheduler) })
    }

    /// Start the periodic sync when enabled in configuration.
    ///
    /// # Errors
    /// Returns the scheduler failure mapped into the domain error.
    pub async fn start_background_sync(&self) -> Result<()> {
        if !self.config.sync.enabled {
            info!("Background calendar sync disabled");
            return Ok(());
        }

        self.scheduler.lock().await.start().await.map_err(LeadflowError::from)
    }

    /// Stop the periodic sync if it is running.
    ///
    /// # Errors
    /// Returns the scheduler failure mapped into the domain error.
    pub async fn shutdown(&self) -> Result<()> {
        let mut scheduler = self.scheduler.lock().await;
        if scheduler.is_running() {
            scheduler.stop().await.map_err(LeadflowError::from)?;
        }
        Ok(())
    }

    pub async fn is_background_sync_running(&self) -> bool {
        self.scheduler.lock().await.is_running()
    }

    /// Component health for the `/health` endpoint.
    pub async fn health(&self) -> HealthStatus {
        let database = match self.db.health_check() {
            Ok(()) => ComponentHealth::healthy("database"),
            Err(err) => ComponentHealth::unhealthy("database", err.to_string()),
        };

        let scheduler = if !self.config.sync.enabled {
            ComponentHealth::healthy("scheduler").with_message("disabled")
        } else if self.is_background_sync_running().await {
            ComponentHealth::healthy("scheduler")
        } else {
            ComponentHealth::unhealthy("scheduler", "not running")
        };

        HealthStatus::from_components(vec![database, scheduler])
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| LeadflowError::Config(format!("cannot create database directory: {e}"))),
        _ => Ok(()),
    }
}
