//! SQLCipher-backed meeting-lead repository.
//!
//! Rows are keyed by a UUID v7 and unique on `(user_id, provider_event_id)`.
//! Re-ingestion only rewrites enrichment. Title, client name, event time,
//! status and the linked proposal keep their first-ingested or user-set values.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use leadflow_core::MeetingLeadRepository;
use leadflow_domain::{
    LeadflowError, MeetingEnrichment, MeetingLead, MeetingLeadStatus, NewMeetingLead,
    Result as DomainResult, UpsertOutcome,
};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::manager::DbManager;
use super::{from_unix, map_join_error};
use crate::errors::InfraError;

const LEAD_COLUMNS: &str = "id, user_id, provider_event_id, title, detected_client_name,
    event_timestamp, status, description, attendees, location, conference_link,
    duration_minutes, linked_proposal_id, created_at, updated_at";

/// SQLCipher implementation of [`MeetingLeadRepository`].
pub struct SqlCipherMeetingLeadRepository {
    db: Arc<DbManager>,
}

impl SqlCipherMeetingLeadRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    async fn run<T, F>(&self, op: F) -> DomainResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Connection) -> DomainResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> DomainResult<T> {
            let conn = db.get_connection()?;
            op(&conn)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl MeetingLeadRepository for SqlCipherMeetingLeadRepository {
    #[instrument(skip(self, lead), fields(event_id = %lead.provider_event_id))]
    async fn upsert_lead(&self, lead: NewMeetingLead) -> DomainResult<UpsertOutcome> {
        self.run(move |conn| {
            let candidate = Uuid::now_v7();
            let now = Utc::now().timestamp();
            let attendees = serde_json::to_string(&lead.enrichment.attendees)
                .map_err(|e| LeadflowError::Internal(format!("attendees encoding: {e}")))?;

            let stored_id: String = conn
                .query_row(
                    "INSERT INTO meeting_leads (
                        id, user_id, provider_event_id, title, detected_client_name,
                        event_timestamp, status, description, attendees, location,
                        conference_link, duration_minutes, linked_proposal_id,
                        created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', ?7, ?8, ?9, ?10, ?11, NULL, ?12, ?12)
                    ON CONFLICT(user_id, provider_event_id) DO UPDATE SET
                        description = excluded.description,
                        attendees = excluded.attendees,
                        location = excluded.location,
                        conference_link = excluded.conference_link,
                        duration_minutes = excluded.duration_minutes,
                        updated_at = excluded.updated_at
                    RETURNING id",
                    params![
                        candidate.to_string(),
                        lead.user_id,
                        lead.provider_event_id,
                        lead.title,
                        lead.detected_client_name,
                        lead.event_timestamp.timestamp(),
                        lead.enrichment.description,
                        attendees,
                        lead.enrichment.location,
                        lead.enrichment.conference_link,
                        lead.enrichment.duration_minutes,
                        now,
                    ],
                    |row| row.get(0),
                )
                .map_err(InfraError::from)?;

            let id = parse_uuid(&stored_id)?;
            let outcome =
                if id == candidate { UpsertOutcome::Inserted(id) } else { UpsertOutcome::Updated(id) };
            debug!(inserted = outcome.is_inserted(), "meeting lead upserted");
            Ok(outcome)
        })
        .await
    }

    async fn list_leads(&self, user_id: &str) -> DomainResult<Vec<MeetingLead>> {
        let user_id = user_id.to_string();
        self.run(move |conn| {
            let sql = format!(
                "SELECT {LEAD_COLUMNS} FROM meeting_leads
                 WHERE user_id = ?1
                 ORDER BY event_timestamp ASC, id ASC"
            );
            let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;
            let leads = stmt
                .query_map(params![user_id], map_lead_row)
                .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
                .map_err(InfraError::from)?;
            Ok(leads)
        })
        .await
    }

    async fn get_lead(&self, user_id: &str, lead_id: Uuid) -> DomainResult<Option<MeetingLead>> {
        let user_id = user_id.to_string();
        self.run(move |conn| select_lead(conn, &user_id, lead_id)).await
    }

    #[instrument(skip(self, linked_proposal_id), fields(%lead_id, %expected, %next))]
    async fn update_status(
        &self,
        user_id: &str,
        lead_id: Uuid,
        expected: MeetingLeadStatus,
        next: MeetingLeadStatus,
        linked_proposal_id: Option<&str>,
    ) -> DomainResult<bool> {
        let user_id = user_id.to_string();
        let linked_proposal_id = linked_proposal_id.map(str::to_string);
        self.run(move |conn| {
            let changed = conn
                .execute(
                    "UPDATE meeting_leads
                     SET status = ?4,
                         linked_proposal_id = COALESCE(?5, linked_proposal_id),
                         updated_at = ?6
                     WHERE id = ?1 AND user_id = ?2 AND status = ?3",
                    params![
                        lead_id.to_string(),
                        user_id,
                        expected.as_str(),
                        next.as_str(),
                        linked_proposal_id,
                        Utc::now().timestamp(),
                    ],
                )
                .map_err(InfraError::from)?;
            Ok(changed == 1)
        })
        .await
    }
}

fn select_lead(
    conn: &rusqlite::Connection,
    user_id: &str,
    lead_id: Uuid,
) -> DomainResult<Option<MeetingLead>> {
    let sql = format!("SELECT {LEAD_COLUMNS} FROM meeting_leads WHERE id = ?1 AND user_id = ?2");
    conn.query_row(&sql, params![lead_id.to_string(), user_id], map_lead_row)
        .optional()
        .map_err(|e| InfraError::from(e).into())
}

fn parse_uuid(raw: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| LeadflowError::Store(format!("invalid lead id {raw}: {e}")))
}

fn map_lead_row(row: &Row<'_>) -> rusqlite::Result<MeetingLead> {
    let id: String = row.get(0)?;
    let status: String = row.get(6)?;
    let attendees: String = row.get(8)?;

    Ok(MeetingLead {
        id: Uuid::parse_str(&id).map_err(|e| conversion_error(0, e))?,
        user_id: row.get(1)?,
        provider_event_id: row.get(2)?,
        title: row.get(3)?,
        detected_client_name: row.get(4)?,
        event_timestamp: from_unix(5, row.get(5)?)?,
        status: MeetingLeadStatus::from_str(&status).map_err(|e| conversion_error(6, e))?,
        enrichment: MeetingEnrichment {
            description: row.get(7)?,
            attendees: serde_json::from_str(&attendees).map_err(|e| conversion_error(8, e))?,
            location: row.get(9)?,
            conference_link: row.get(10)?,
            duration_minutes: row.get(11)?,
        },
        linked_proposal_id: row.get(12)?,
        created_at: from_unix(13, row.get(13)?)?,
        updated_at: from_unix(14, row.get(14)?)?,
    })
}

fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, err.into())
}
