//! Port interfaces for authorization and credential storage
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadflow_common::PKCEChallenge;
use leadflow_domain::{CalendarCredential, CredentialGrant, PendingAuthorization, Result, TokenGrant};

/// Persistence for the per-user calendar credential.
///
/// Every operation is scoped by `user_id`; implementations must never
/// return or touch another user's record.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn find_by_user(&self, user_id: &str) -> Result<Option<CalendarCredential>>;

    /// Insert the credential, or update it in place if one exists.
    ///
    /// Always leaves the record enabled. A grant without a refresh token
    /// keeps the stored one.
    async fn upsert_from_exchange(&self, grant: CredentialGrant) -> Result<CalendarCredential>;

    /// Persist a refreshed access token and expiry. A rotated refresh token
    /// in the grant replaces the stored one. Does not change `enabled`.
    async fn update_tokens(&self, user_id: &str, grant: &TokenGrant) -> Result<()>;

    async fn set_enabled(&self, user_id: &str, enabled: bool) -> Result<()>;

    async fn touch_last_sync(&self, user_id: &str, at: DateTime<Utc>) -> Result<()>;

    /// Hard delete. Returns whether a record existed.
    async fn delete(&self, user_id: &str) -> Result<bool>;

    async fn list_enabled_user_ids(&self) -> Result<Vec<String>>;
}

/// OAuth2 identity provider (authorization URL, token and user-info
/// endpoints).
///
/// Exchange failures surface as `LeadflowError::AuthExchange`, refresh
/// failures as `LeadflowError::TokenRefresh` with `revoked` set when the
/// provider reports the grant as invalid.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Redirect URI used when the caller does not supply one.
    fn default_redirect_uri(&self) -> String;

    /// Build the browser authorization URL. Fails with `Config` when no
    /// client identifier is configured.
    fn authorization_url(&self, challenge: &PKCEChallenge, redirect_uri: &str) -> Result<String>;

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<TokenGrant>;

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant>;

    /// Email of the account behind the access token, if the provider
    /// returns one.
    async fn fetch_user_email(&self, access_token: &str) -> Result<Option<String>>;
}

/// Short-lived slot holding PKCE verifiers keyed by authorization state.
#[async_trait]
pub trait PendingAuthorizationStore: Send + Sync {
    async fn put(&self, state: &str, pending: PendingAuthorization) -> Result<()>;

    /// Remove and return the slot for `state`.
    async fn take(&self, state: &str) -> Result<Option<PendingAuthorization>>;
}
