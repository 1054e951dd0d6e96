//! Sync triggering: minimum-interval guard and coordinator

pub mod coordinator;
pub mod guard;

pub use coordinator::SyncCoordinator;
pub use guard::SyncGuard;
