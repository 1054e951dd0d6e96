//! # Leadflow Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for credential and lead stores, the identity
//!   provider, the calendar source and the pending-authorization slot
//! - The token lifecycle manager, the ingestion pipeline, the meeting-lead
//!   status service and the sync guard/coordinator
//!
//! ## Architecture Principles
//! - Only depends on `leadflow-common` and `leadflow-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod auth;
pub mod ingestion;
pub mod leads;
pub mod sync;

pub use auth::ports::{CredentialRepository, IdentityProvider, PendingAuthorizationStore};
pub use auth::TokenLifecycleManager;
pub use ingestion::ports::{CalendarSource, MeetingLeadRepository};
pub use ingestion::MeetingIngestionPipeline;
pub use leads::MeetingLeadService;
pub use sync::{SyncCoordinator, SyncGuard};
