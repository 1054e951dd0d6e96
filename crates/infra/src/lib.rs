//! # Leadflow Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Database implementations (SQLite/SQLCipher)
//! - Google identity provider and calendar clients
//! - The pending-authorization TTL cache
//! - Configuration loading
//! - The periodic calendar sync scheduler
//!
//! ## Architecture
//! - Implements traits defined in `leadflow-core`
//! - Depends on `leadflow-common`, `leadflow-domain` and `leadflow-core`
//! - Contains all "impure" code (I/O, HTTP, timers)

pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod integrations;
pub mod scheduling;

// Re-export commonly used items
pub use auth::MokaPendingAuthorizationStore;
pub use database::{DbManager, SqlCipherCredentialRepository, SqlCipherMeetingLeadRepository};
pub use errors::InfraError;
pub use integrations::{GoogleCalendarClient, GoogleIdentityProvider};
pub use scheduling::{CalendarSyncScheduler, CalendarSyncSchedulerConfig};
