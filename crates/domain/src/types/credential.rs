//! Calendar credential record and the authorization shapes around it

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Persisted calendar credential, one per user.
///
/// `enabled = false` means the stored access token must not be used until
/// the user authorizes again. A missing record means "never connected".
#[derive(Clone, PartialEq, Eq)]
pub struct CalendarCredential {
    pub user_id: String,
    pub access_token: String,
    /// Absent for sessions created before offline access was requested.
    pub refresh_token: Option<String>,
    pub token_expiry: Option<DateTime<Utc>>,
    pub provider_email: Option<String>,
    pub enabled: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub calendar_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CalendarCredential {
    /// True when the access token is unset or expires within `margin_secs`.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
        self.token_expiry.map_or(true, |expiry| expiry <= now + Duration::seconds(margin_secs))
    }

    #[must_use]
    pub const fn connection_state(&self) -> ConnectionState {
        if self.enabled {
            ConnectionState::Connected
        } else {
            ConnectionState::NeedsReconnect
        }
    }

    /// Secret-free projection for the UI.
    #[must_use]
    pub fn view(&self) -> CredentialView {
        CredentialView {
            connection_state: self.connection_state(),
            provider_email: self.provider_email.clone(),
            enabled: self.enabled,
            has_refresh_token: self.refresh_token.is_some(),
            token_expiry: self.token_expiry,
            last_sync: self.last_sync,
            calendar_id: self.calendar_id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl std::fmt::Debug for CalendarCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarCredential")
            .field("user_id", &self.user_id)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("token_expiry", &self.token_expiry)
            .field("provider_email", &self.provider_email)
            .field("enabled", &self.enabled)
            .field("last_sync", &self.last_sync)
            .field("calendar_id", &self.calendar_id)
            .finish_non_exhaustive()
    }
}

/// Connection state derived from the presence and `enabled` flag of the
/// credential record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    NotConnected,
    NeedsReconnect,
    Connected,
}

impl_domain_status_conversions!(ConnectionState {
    NotConnected => "not_connected",
    NeedsReconnect => "needs_reconnect",
    Connected => "connected",
});

impl ConnectionState {
    #[must_use]
    pub const fn of(credential: Option<&CalendarCredential>) -> Self {
        match credential {
            None => Self::NotConnected,
            Some(c) => c.connection_state(),
        }
    }
}

/// Credential as shown to the UI, with tokens omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialView {
    pub connection_state: ConnectionState,
    pub provider_email: Option<String>,
    pub enabled: bool,
    pub has_refresh_token: bool,
    pub token_expiry: Option<DateTime<Utc>>,
    pub last_sync: Option<DateTime<Utc>>,
    pub calendar_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tokens returned by the identity provider for an exchange or refresh.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Values written to the credential store after a successful exchange.
///
/// A `None` refresh token keeps whatever refresh token is already stored.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialGrant {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expiry: DateTime<Utc>,
    pub provider_email: Option<String>,
}

impl CredentialGrant {
    #[must_use]
    pub fn from_token_grant(
        user_id: impl Into<String>,
        grant: TokenGrant,
        provider_email: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            token_expiry: grant.expires_at,
            provider_email,
        }
    }
}

impl std::fmt::Debug for CredentialGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialGrant")
            .field("user_id", &self.user_id)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("token_expiry", &self.token_expiry)
            .field("provider_email", &self.provider_email)
            .finish()
    }
}

/// Result of starting an authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

/// Server-side slot holding the PKCE verifier between redirect and exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingAuthorization {
    pub user_id: String,
    pub code_verifier: String,
    pub redirect_uri: String,
}

impl std::fmt::Debug for PendingAuthorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingAuthorization")
            .field("user_id", &self.user_id)
            .field("code_verifier", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// Code exchange input.
///
/// Either `code_verifier` (held by the client) or `state` (resolving the
/// server-side slot) must be present. `redirect_uri` must match the one used
/// for the authorization request.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    pub code: String,
    #[serde(default)]
    pub code_verifier: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

impl std::fmt::Debug for ExchangeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeRequest")
            .field("code", &"[REDACTED]")
            .field("code_verifier", &self.code_verifier.as_ref().map(|_| "[REDACTED]"))
            .field("state", &self.state)
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeOutcome {
    pub email: Option<String>,
}
