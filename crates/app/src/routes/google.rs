//! Google Calendar connection routes: authorize, exchange, sync, status and
//! disconnect.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use leadflow_domain::{AuthorizationRequest, CredentialView, ExchangeRequest, LeadflowError};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::extract::UserId;
use crate::error::ApiError;
use crate::utils::logging::log_request_outcome;
use crate::AppContext;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeBody {
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExchangeResponse {
    pub success: bool,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    pub new_event_count: usize,
    pub updated_event_count: usize,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// `POST /integrations/google/authorize`
///
/// The body is optional; an empty body uses the configured redirect URI.
#[instrument(skip_all)]
pub async fn authorize(
    State(ctx): State<Arc<AppContext>>,
    UserId(user_id): UserId,
    body: Bytes,
) -> Result<Json<AuthorizationRequest>, ApiError> {
    let body: AuthorizeBody = if body.iter().all(u8::is_ascii_whitespace) {
        AuthorizeBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| LeadflowError::InvalidInput(format!("invalid request body: {e}")))?
    };

    let request = ctx.tokens.begin_authorization(&user_id, body.redirect_uri.as_deref()).await?;
    Ok(Json(request))
}

/// `POST /integrations/google/exchange`
#[instrument(skip_all)]
pub async fn exchange(
    State(ctx): State<Arc<AppContext>>,
    UserId(user_id): UserId,
    Json(request): Json<ExchangeRequest>,
) -> Result<Json<ExchangeResponse>, ApiError> {
    let started = Instant::now();
    let result = ctx.tokens.exchange_code(&user_id, request).await;
    log_request_outcome("google.exchange", started.elapsed(), result.as_ref().map(|_| ()));

    let outcome = result?;
    // A new connection is due for an immediate sync on the next tick.
    ctx.coordinator.forget(&user_id);
    Ok(Json(ExchangeResponse { success: true, email: outcome.email }))
}

/// `POST /integrations/google/sync`
#[instrument(skip_all)]
pub async fn sync(
    State(ctx): State<Arc<AppContext>>,
    UserId(user_id): UserId,
) -> Result<Json<SyncResponse>, ApiError> {
    let started = Instant::now();
    let result = ctx.coordinator.sync_now(&user_id).await;
    log_request_outcome("google.sync", started.elapsed(), result.as_ref().map(|_| ()));

    let report = result?;
    Ok(Json(SyncResponse {
        success: true,
        new_event_count: report.new_event_count,
        updated_event_count: report.updated_event_count,
    }))
}

/// `GET /integrations/google`, `null` when never connected.
pub async fn status(
    State(ctx): State<Arc<AppContext>>,
    UserId(user_id): UserId,
) -> Result<Json<Option<CredentialView>>, ApiError> {
    Ok(Json(ctx.tokens.credential_view(&user_id).await?))
}

/// `DELETE /integrations/google`
#[instrument(skip_all)]
pub async fn disconnect(
    State(ctx): State<Arc<AppContext>>,
    UserId(user_id): UserId,
) -> Result<Json<SuccessResponse>, ApiError> {
    ctx.tokens.disconnect(&user_id).await?;
    ctx.coordinator.forget(&user_id);
    Ok(Json(SuccessResponse { success: true }))
}
