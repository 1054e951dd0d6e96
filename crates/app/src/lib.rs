//! # Leadflow App
//!
//! HTTP application layer and process entry point.
//!
//! This crate contains:
//! - Axum routes (UI → backend bridge)
//! - Application context (dependency injection)
//! - Tracing setup
//!
//! ## Architecture
//! - Depends on `domain`, `core` and `infra`
//! - Wires the ports in `core` to their `infra` adapters

pub mod context;
pub mod error;
pub mod routes;
pub mod utils;

pub use context::AppContext;
pub use error::ApiError;
pub use routes::router;
