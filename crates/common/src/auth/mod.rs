//! OAuth 2.0 Authorization Code + PKCE infrastructure
//!
//! Provides the provider-agnostic pieces of the authorization flow:
//!
//! - **[`pkce`]**: RFC 7636 verifier/challenge/state generation
//! - **[`types`]**: token-endpoint response and error shapes, [`TokenSet`]
//! - **[`client`]**: HTTP client for authorization URL building, code
//!   exchange and refresh against a token endpoint
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  OAuthClient     │  token endpoint (form POST, JSON response)
//! └────────┬─────────┘
//!          │
//!          └──► PKCE utilities   (challenge generation)
//! ```
//!
//! The client never stores verifiers. Callers own the pending-authorization
//! slot and pass the verifier back in at exchange time.

#[cfg(feature = "platform")]
pub mod client;
pub mod pkce;
pub mod types;

// Re-export commonly used types and functions
#[cfg(feature = "platform")]
pub use client::{OAuthClient, OAuthClientError};
pub use pkce::{generate_code_challenge, generate_code_verifier, generate_state, PKCEChallenge};
pub use types::{OAuthConfig, OAuthError, TokenResponse, TokenSet};
