//! HTTP error envelope
//!
//! Every failure is rendered as `{ "success": false, "code", "error" }` so
//! the UI can branch on `code` (notably `TOKEN_EXPIRED`, which prompts a
//! reconnect instead of a generic failure toast).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use leadflow_domain::LeadflowError;
use serde::Serialize;

/// Error returned by route handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request carried no caller identity.
    Unauthenticated,
    Domain(LeadflowError),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Domain(err) => status_for(err),
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Domain(err) => err.code(),
        }
    }
}

impl From<LeadflowError> for ApiError {
    fn from(err: LeadflowError) -> Self {
        Self::Domain(err)
    }
}

const fn status_for(err: &LeadflowError) -> StatusCode {
    match err {
        LeadflowError::InvalidInput(_) | LeadflowError::AuthExchange(_) => StatusCode::BAD_REQUEST,
        LeadflowError::TokenExpired => StatusCode::UNAUTHORIZED,
        LeadflowError::NotFound(_) => StatusCode::NOT_FOUND,
        LeadflowError::NotConnected | LeadflowError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        LeadflowError::TokenRefresh { .. }
        | LeadflowError::CalendarFetch { .. }
        | LeadflowError::Network(_) => StatusCode::BAD_GATEWAY,
        LeadflowError::Store(_) | LeadflowError::Config(_) | LeadflowError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    code: &'a str,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Unauthenticated => "missing x-user-id header".to_string(),
            // Storage and internal details stay in the logs.
            Self::Domain(err @ (LeadflowError::Store(_) | LeadflowError::Internal(_))) => {
                tracing::error!(code = err.code(), error = %err, "request failed");
                "Internal server error".to_string()
            }
            Self::Domain(err) => err.to_string(),
        };

        (status, Json(ErrorBody { success: false, code: self.code(), error: message }))
            .into_response()
    }
}
