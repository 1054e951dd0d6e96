//! HTTP routes
//!
//! Every route except `/health` requires the `x-user-id` header.

pub mod extract;
pub mod google;
pub mod leads;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::utils::health::HealthStatus;
use crate::AppContext;

/// Build the application router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/integrations/google", get(google::status).delete(google::disconnect))
        .route("/integrations/google/authorize", post(google::authorize))
        .route("/integrations/google/exchange", post(google::exchange))
        .route("/integrations/google/sync", post(google::sync))
        .route("/meeting-leads", get(leads::list))
        .route("/meeting-leads/{id}/ignore", post(leads::ignore))
        .route("/meeting-leads/{id}/restore", post(leads::restore))
        .route("/meeting-leads/{id}/link", post(leads::link))
        .with_state(ctx)
}

/// `GET /health`, 503 when a component is unhealthy.
async fn health(State(ctx): State<Arc<AppContext>>) -> (StatusCode, Json<HealthStatus>) {
    let status = ctx.health().await;
    let code = if status.is_healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(status))
}
