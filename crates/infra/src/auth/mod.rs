//! Authorization adapters

pub mod pending;

pub use pending::{MokaPendingAuthorizationStore, PendingCacheConfig};
