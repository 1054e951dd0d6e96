//! Modular common utilities shared across Leadflow crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: pure helpers (PKCE generation, identifier redaction)
//! - `observability`: tracing instrumentation for the tiers above
//! - `platform`: OAuth 2.0 token-endpoint client and SQLCipher storage

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod privacy;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod auth;
#[cfg(feature = "platform")]
pub mod storage;

// Re-export commonly used types and functions
// ------------------------
#[cfg(feature = "foundation")]
pub use auth::pkce::PKCEChallenge;
#[cfg(feature = "platform")]
pub use auth::{OAuthClient, OAuthClientError, OAuthConfig, TokenSet};
#[cfg(feature = "foundation")]
pub use privacy::redact_identifier;
#[cfg(feature = "platform")]
pub use storage::{SqlCipherConnection, SqlCipherPool, SqlCipherPoolConfig, StorageError};
