//! Google identity provider
//!
//! Wraps the shared [`OAuthClient`] with Google's offline-access parameters
//! and adds the user-info lookup used to label a connection with its email.

use std::time::Duration;

use async_trait::async_trait;
use leadflow_common::auth::{OAuthClient, OAuthClientError, OAuthConfig, PKCEChallenge, TokenSet};
use leadflow_core::IdentityProvider;
use leadflow_domain::{GoogleConfig, LeadflowError, Result, TokenGrant};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::errors::InfraError;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// [`IdentityProvider`] backed by Google's OAuth2 endpoints.
#[derive(Debug, Clone)]
pub struct GoogleIdentityProvider {
    oauth: OAuthClient,
    http: Client,
    userinfo_url: String,
}

impl GoogleIdentityProvider {
    /// Build the provider from configuration.
    ///
    /// An empty client id is accepted here; building an authorization URL
    /// then fails with `Config`.
    ///
    /// # Errors
    /// Returns `Config` if the HTTP client cannot be constructed.
    pub fn new(config: &GoogleConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| LeadflowError::Config(format!("http client: {e}")))?;

        let oauth_config = OAuthConfig {
            authorization_endpoint: config.auth_url.clone(),
            token_endpoint: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: GoogleConfig::scopes(),
            extra_authorize_params: vec![
                ("access_type".to_string(), "offline".to_string()),
                ("prompt".to_string(), "consent".to_string()),
            ],
        };

        Ok(Self {
            oauth: OAuthClient::with_http_client(oauth_config, http.clone()),
            http,
            userinfo_url: config.userinfo_url.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn default_redirect_uri(&self) -> String {
        self.oauth.redirect_uri().to_string()
    }

    fn authorization_url(&self, challenge: &PKCEChallenge, redirect_uri: &str) -> Result<String> {
        self.oauth
            .authorization_url(challenge, Some(redirect_uri))
            .map_err(|e| InfraError::from(e).into())
    }

    #[instrument(skip(self, code, code_verifier))]
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<TokenGrant> {
        self.oauth
            .exchange_code(code, code_verifier, redirect_uri)
            .await
            .map(into_grant)
            .map_err(map_exchange_error)
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant> {
        self.oauth
            .refresh_access_token(refresh_token)
            .await
            .map(into_grant)
            .map_err(map_refresh_error)
    }

    #[instrument(skip(self, access_token))]
    async fn fetch_user_email(&self, access_token: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), "userinfo request rejected");
            return Ok(None);
        }

        let info: UserInfo = response.json().await.map_err(InfraError::from)?;
        debug!(has_email = info.email.is_some(), "userinfo fetched");
        Ok(info.email.filter(|e| !e.trim().is_empty()))
    }
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
}

fn into_grant(tokens: TokenSet) -> TokenGrant {
    TokenGrant {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_at: tokens.expires_at,
    }
}

fn map_exchange_error(err: OAuthClientError) -> LeadflowError {
    match err {
        OAuthClientError::RequestFailed(e) => InfraError::from(e).into(),
        OAuthClientError::ConfigError(msg) => LeadflowError::Config(msg),
        other => LeadflowError::AuthExchange(other.provider_message()),
    }
}

fn map_refresh_error(err: OAuthClientError) -> LeadflowError {
    let revoked = err.is_invalid_grant();
    match err {
        OAuthClientError::RequestFailed(e) => InfraError::from(e).into(),
        other => LeadflowError::TokenRefresh { message: other.provider_message(), revoked },
    }
}
