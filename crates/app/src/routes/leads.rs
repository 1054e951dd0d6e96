//! Meeting-lead routes

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use leadflow_domain::{LeadflowError, MeetingLead};
use serde::Deserialize;
use uuid::Uuid;

use super::extract::UserId;
use crate::error::ApiError;
use crate::AppContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkBody {
    pub proposal_id: String,
}

/// `GET /meeting-leads`, ordered by event time.
pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    UserId(user_id): UserId,
) -> Result<Json<Vec<MeetingLead>>, ApiError> {
    Ok(Json(ctx.leads.list(&user_id).await?))
}

/// `POST /meeting-leads/{id}/ignore`
pub async fn ignore(
    State(ctx): State<Arc<AppContext>>,
    UserId(user_id): UserId,
    Path(id): Path<String>,
) -> Result<Json<MeetingLead>, ApiError> {
    Ok(Json(ctx.leads.mark_ignored(&user_id, parse_lead_id(&id)?).await?))
}

/// `POST /meeting-leads/{id}/restore`
pub async fn restore(
    State(ctx): State<Arc<AppContext>>,
    UserId(user_id): UserId,
    Path(id): Path<String>,
) -> Result<Json<MeetingLead>, ApiError> {
    Ok(Json(ctx.leads.mark_pending(&user_id, parse_lead_id(&id)?).await?))
}

/// `POST /meeting-leads/{id}/link`
pub async fn link(
    State(ctx): State<Arc<AppContext>>,
    UserId(user_id): UserId,
    Path(id): Path<String>,
    Json(body): Json<LinkBody>,
) -> Result<Json<MeetingLead>, ApiError> {
    let lead_id = parse_lead_id(&id)?;
    Ok(Json(ctx.leads.mark_linked(&user_id, lead_id, &body.proposal_id).await?))
}

fn parse_lead_id(raw: &str) -> Result<Uuid, LeadflowError> {
    Uuid::parse_str(raw).map_err(|_| LeadflowError::InvalidInput(format!("invalid lead id: {raw}")))
}
