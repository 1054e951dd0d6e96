//! Calendar authorization and token lifecycle

pub mod ports;
pub mod service;

pub use service::TokenLifecycleManager;
