//! OAuth 2.0 client implementation with PKCE support
//!
//! Handles the provider-facing half of the Authorization Code + PKCE flow:
//! - Authorization URL building
//! - Authorization code exchange (`grant_type=authorization_code`)
//! - Token refresh (`grant_type=refresh_token`)
//!
//! Requests are form-encoded; responses are JSON. Every call is a single
//! attempt; retry policy belongs to the caller.

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Response};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::pkce::PKCEChallenge;
use super::types::{OAuthConfig, OAuthError, TokenResponse, TokenSet};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for OAuth client operations
#[derive(Debug, Error)]
pub enum OAuthClientError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// OAuth server returned a structured error response
    #[error("OAuth error (HTTP {status}): {error}")]
    OAuth { status: u16, error: OAuthError },

    /// OAuth server returned a non-success status without a parseable body
    #[error("Unexpected HTTP {status} from token endpoint: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Failed to parse a success response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No refresh token available
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl OAuthClientError {
    /// True when the provider rejected the grant as invalid or revoked.
    #[must_use]
    pub fn is_invalid_grant(&self) -> bool {
        matches!(self, Self::OAuth { error, .. } if error.is_invalid_grant())
    }

    /// Provider-facing message suitable for diagnostics.
    #[must_use]
    pub fn provider_message(&self) -> String {
        match self {
            Self::OAuth { error, .. } => error.message().to_string(),
            other => other.to_string(),
        }
    }
}

/// OAuth 2.0 client with PKCE support
///
/// Implements RFC 6749 (OAuth 2.0) and RFC 7636 (PKCE).
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    client: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with its own HTTP connection pool.
    ///
    /// # Errors
    /// Returns `ConfigError` if the HTTP client cannot be constructed.
    pub fn new(config: OAuthConfig) -> Result<Self, OAuthClientError> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| OAuthClientError::ConfigError(format!("http client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Create a client that shares an existing HTTP client.
    #[must_use]
    pub const fn with_http_client(config: OAuthConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Build the browser authorization URL for the given PKCE challenge.
    ///
    /// `redirect_uri` overrides the configured default when present.
    ///
    /// # Errors
    /// Returns `ConfigError` when no client identifier is configured.
    ///
    /// # Examples
    /// ```
    /// use leadflow_common::auth::{OAuthClient, OAuthConfig, PKCEChallenge};
    ///
    /// let config = OAuthConfig {
    ///     authorization_endpoint: "https://accounts.example.com/auth".into(),
    ///     token_endpoint: "https://accounts.example.com/token".into(),
    ///     client_id: "client".into(),
    ///     client_secret: None,
    ///     redirect_uri: "http://localhost:8787/callback".into(),
    ///     scopes: vec!["email".into()],
    ///     extra_authorize_params: vec![],
    /// };
    /// let client = OAuthClient::new(config).unwrap();
    /// let url = client.authorization_url(&PKCEChallenge::generate(), None).unwrap();
    /// assert!(url.contains("code_challenge_method=S256"));
    /// ```
    pub fn authorization_url(
        &self,
        challenge: &PKCEChallenge,
        redirect_uri: Option<&str>,
    ) -> Result<String, OAuthClientError> {
        if self.config.client_id.trim().is_empty() {
            return Err(OAuthClientError::ConfigError("client id is not configured".into()));
        }

        let redirect_uri = redirect_uri.unwrap_or(&self.config.redirect_uri);

        let mut params = vec![
            ("client_id", self.config.client_id.clone()),
            ("redirect_uri", redirect_uri.to_string()),
            ("response_type", "code".to_string()),
            ("scope", self.config.scope_string()),
            ("state", challenge.state.clone()),
            ("code_challenge", challenge.code_challenge.clone()),
            ("code_challenge_method", challenge.challenge_method().to_string()),
        ];
        params.extend(
            self.config.extra_authorize_params.iter().map(|(k, v)| (k.as_str(), v.clone())),
        );

        let query_string = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let separator = if self.config.authorization_endpoint.contains('?') { '&' } else { '?' };
        Ok(format!("{}{separator}{query_string}", self.config.authorization_endpoint))
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    /// Returns `OAuth` with the provider's error body on a non-2xx response,
    /// `RequestFailed` on transport failure.
    #[instrument(skip(self, code, code_verifier))]
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("code_verifier", code_verifier),
        ];
        if let Some(secret) = self.config.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }

        let tokens = self.post_token_request(&form).await?;
        debug!(has_refresh_token = tokens.refresh_token.is_some(), "authorization code exchanged");
        Ok(tokens)
    }

    /// Refresh an access token using a refresh token.
    ///
    /// # Errors
    /// Returns `NoRefreshToken` for an empty token, otherwise the same
    /// errors as [`Self::exchange_code`].
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        if refresh_token.is_empty() {
            return Err(OAuthClientError::NoRefreshToken);
        }

        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
        ];
        if let Some(secret) = self.config.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }

        self.post_token_request(&form).await
    }

    /// Get the configured default redirect URI
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.config.redirect_uri
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub const fn config(&self) -> &OAuthConfig {
        &self.config
    }

    async fn post_token_request(
        &self,
        form: &[(&str, &str)],
    ) -> Result<TokenSet, OAuthClientError> {
        let response = self.client.post(&self.config.token_endpoint).form(form).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let issued_at = Utc::now();
        let token_response: TokenResponse =
            response.json().await.map_err(|e| OAuthClientError::ParseError(e.to_string()))?;

        Ok(token_response.into_token_set(issued_at))
    }
}

async fn error_from_response(response: Response) -> OAuthClientError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<OAuthError>(&body) {
        Ok(error) => {
            warn!(status, error = %error.error, "token endpoint rejected request");
            OAuthClientError::OAuth { status, error }
        }
        Err(_) => {
            warn!(status, "token endpoint returned an unparseable error body");
            OAuthClientError::UnexpectedStatus { status, body }
        }
    }
}
