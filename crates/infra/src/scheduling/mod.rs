//! Scheduling infrastructure for periodic calendar sync
//!
//! The scheduler follows the runtime rules used across the crate:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on all async operations

pub mod calendar_scheduler;
pub mod error;

pub use calendar_scheduler::{CalendarSyncScheduler, CalendarSyncSchedulerConfig, SyncPassSummary};
pub use error::{SchedulerError, SchedulerResult};
