//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Leadflow
///
/// Every failure of the ingestion pipeline surfaces as one of these
/// variants; callers discriminate on the variant (or on [`Self::code`])
/// rather than on message text.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum LeadflowError {
    /// No credential record exists for the user.
    #[error("Calendar is not connected")]
    NotConnected,

    /// The credential is disabled or can no longer be refreshed; the user
    /// must authorize again.
    #[error("Calendar authorization expired, reconnection required")]
    TokenExpired,

    /// The identity provider rejected the authorization-code exchange.
    #[error("Authorization exchange failed: {0}")]
    AuthExchange(String),

    /// The identity provider rejected a refresh, or the refresh call failed.
    #[error("Token refresh failed: {message}")]
    TokenRefresh {
        message: String,
        /// True when the provider reported the refresh token as revoked.
        revoked: bool,
    },

    /// Non-success response from the calendar endpoint.
    #[error("Calendar fetch failed with HTTP {status}: {message}")]
    CalendarFetch { status: u16, message: String },

    #[error("Storage error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LeadflowError {
    /// Stable machine-readable code for API responses and log fields.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotConnected => "NOT_CONNECTED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::AuthExchange(_) => "AUTH_EXCHANGE_FAILED",
            Self::TokenRefresh { .. } => "TOKEN_REFRESH_FAILED",
            Self::CalendarFetch { .. } => "CALENDAR_FETCH_FAILED",
            Self::Store(_) => "STORE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Network(_) => "NETWORK_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True for a calendar response that invalidates the access token.
    #[must_use]
    pub const fn is_calendar_unauthorized(&self) -> bool {
        matches!(self, Self::CalendarFetch { status: 401, .. })
    }

    /// True when the user has to repeat authorization before syncing again.
    #[must_use]
    pub const fn requires_reconnect(&self) -> bool {
        matches!(self, Self::TokenExpired | Self::NotConnected)
    }
}

/// Result type alias for Leadflow operations
pub type Result<T> = std::result::Result<T, LeadflowError>;
