//! Token lifecycle manager - OAuth2 PKCE exchange and refresh policy

use std::sync::Arc;

use chrono::Utc;
use leadflow_common::{redact_identifier, PKCEChallenge};
use leadflow_domain::constants::TOKEN_REFRESH_MARGIN_SECS;
use leadflow_domain::{
    AuthorizationRequest, CalendarCredential, CredentialGrant, CredentialView, ExchangeOutcome,
    ExchangeRequest, LeadflowError, PendingAuthorization, Result,
};
use tracing::{debug, info, instrument, warn};

use super::ports::{CredentialRepository, IdentityProvider, PendingAuthorizationStore};

/// Owns the authorization-code exchange and the refresh-before-expiry
/// policy for calendar credentials.
pub struct TokenLifecycleManager {
    credentials: Arc<dyn CredentialRepository>,
    identity: Arc<dyn IdentityProvider>,
    pending: Arc<dyn PendingAuthorizationStore>,
}

impl TokenLifecycleManager {
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        identity: Arc<dyn IdentityProvider>,
        pending: Arc<dyn PendingAuthorizationStore>,
    ) -> Self {
        Self { credentials, identity, pending }
    }

    /// Start an authorization attempt.
    ///
    /// Generates a PKCE pair, parks the verifier in the pending slot keyed by
    /// the returned state, and builds the provider URL with offline access
    /// and forced consent.
    ///
    /// # Errors
    /// `Config` when no client identifier is configured.
    #[instrument(skip(self, user_id), fields(user = %redact_identifier(user_id)))]
    pub async fn begin_authorization(
        &self,
        user_id: &str,
        redirect_uri: Option<&str>,
    ) -> Result<AuthorizationRequest> {
        let redirect_uri = redirect_uri
            .filter(|uri| !uri.trim().is_empty())
            .map_or_else(|| self.identity.default_redirect_uri(), str::to_string);

        let challenge = PKCEChallenge::generate();
        let url = self.identity.authorization_url(&challenge, &redirect_uri)?;

        self.pending
            .put(
                &challenge.state,
                PendingAuthorization {
                    user_id: user_id.to_string(),
                    code_verifier: challenge.code_verifier.clone(),
                    redirect_uri,
                },
            )
            .await?;

        debug!("authorization started");
        Ok(AuthorizationRequest { url, state: challenge.state })
    }

    /// Exchange an authorization code and upsert the user's credential.
    ///
    /// The verifier comes from the request or from the pending slot named by
    /// `state`. The slot is removed before the provider call, so it is
    /// discarded whatever the outcome. A user-info failure is tolerated and
    /// leaves the email unset.
    ///
    /// # Errors
    /// `InvalidInput` for a missing code or verifier, an unknown state or a
    /// state started by another user; `AuthExchange` when the provider
    /// rejects the code; `Store` on persistence failure.
    #[instrument(skip(self, user_id, request), fields(user = %redact_identifier(user_id)))]
    pub async fn exchange_code(
        &self,
        user_id: &str,
        request: ExchangeRequest,
    ) -> Result<ExchangeOutcome> {
        let pending = match request.state.as_deref().filter(|s| !s.is_empty()) {
            Some(state) => Some(self.take_pending(user_id, state).await?),
            None => None,
        };

        if request.code.trim().is_empty() {
            return Err(LeadflowError::InvalidInput("authorization code is required".into()));
        }

        let code_verifier = request
            .code_verifier
            .filter(|v| !v.is_empty())
            .or_else(|| pending.as_ref().map(|p| p.code_verifier.clone()))
            .ok_or_else(|| LeadflowError::InvalidInput("code verifier is required".into()))?;

        let redirect_uri = request
            .redirect_uri
            .filter(|uri| !uri.trim().is_empty())
            .or_else(|| pending.map(|p| p.redirect_uri))
            .unwrap_or_else(|| self.identity.default_redirect_uri());

        let grant = self.identity.exchange_code(&request.code, &code_verifier, &redirect_uri).await?;

        let email = match self.identity.fetch_user_email(&grant.access_token).await {
            Ok(email) => email,
            Err(err) => {
                warn!(error = %err, "user-info lookup failed, continuing without email");
                None
            }
        };

        let stored = self
            .credentials
            .upsert_from_exchange(CredentialGrant::from_token_grant(user_id, grant, email.clone()))
            .await?;

        info!(has_refresh_token = stored.refresh_token.is_some(), "calendar connected");
        Ok(ExchangeOutcome { email })
    }

    /// Return an access token that is valid beyond the safety margin.
    ///
    /// A token outside the margin is returned as-is with no network call. A
    /// token inside the margin is refreshed when a refresh token exists.
    /// Without one the credential is disabled, which requires the user to
    /// authorize again. A provider-reported revocation also disables it;
    /// any other refresh failure is returned and leaves the record untouched.
    ///
    /// # Errors
    /// `TokenExpired` for disabled, unrefreshable or revoked credentials;
    /// `TokenRefresh` for other refresh failures; `Store` on persistence
    /// failure.
    #[instrument(skip(self, credential), fields(user = %redact_identifier(&credential.user_id)))]
    pub async fn ensure_fresh_token(&self, credential: &CalendarCredential) -> Result<String> {
        if !credential.enabled {
            return Err(LeadflowError::TokenExpired);
        }

        if !credential.needs_refresh(Utc::now(), TOKEN_REFRESH_MARGIN_SECS) {
            return Ok(credential.access_token.clone());
        }

        let Some(refresh_token) = credential.refresh_token.as_deref().filter(|t| !t.is_empty())
        else {
            warn!("access token expired and no refresh token is stored, disabling credential");
            self.credentials.set_enabled(&credential.user_id, false).await?;
            return Err(LeadflowError::TokenExpired);
        };

        match self.identity.refresh(refresh_token).await {
            Ok(grant) => {
                self.credentials.update_tokens(&credential.user_id, &grant).await?;
                debug!(expires_at = %grant.expires_at, "access token refreshed");
                Ok(grant.access_token)
            }
            Err(LeadflowError::TokenRefresh { revoked: true, message }) => {
                warn!(%message, "refresh token revoked, disabling credential");
                self.credentials.set_enabled(&credential.user_id, false).await?;
                Err(LeadflowError::TokenExpired)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed");
                Err(err)
            }
        }
    }

    /// Remove the user's credential. Deleting a missing record is not an
    /// error.
    #[instrument(skip(self, user_id), fields(user = %redact_identifier(user_id)))]
    pub async fn disconnect(&self, user_id: &str) -> Result<()> {
        let existed = self.credentials.delete(user_id).await?;
        info!(existed, "calendar disconnected");
        Ok(())
    }

    /// Current credential without secrets, or `None` when never connected.
    pub async fn credential_view(&self, user_id: &str) -> Result<Option<CredentialView>> {
        Ok(self.credentials.find_by_user(user_id).await?.map(|c| c.view()))
    }

    async fn take_pending(&self, user_id: &str, state: &str) -> Result<PendingAuthorization> {
        let pending = self.pending.take(state).await?.ok_or_else(|| {
            LeadflowError::InvalidInput("authorization state is unknown or expired".into())
        })?;

        if pending.user_id != user_id {
            warn!("authorization state belongs to a different user");
            return Err(LeadflowError::InvalidInput(
                "authorization state does not belong to this user".into(),
            ));
        }
        Ok(pending)
    }
}
