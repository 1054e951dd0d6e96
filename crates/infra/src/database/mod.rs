//! Database implementations

pub mod credential_repository;
pub mod manager;
pub mod meeting_lead_repository;

pub use credential_repository::SqlCipherCredentialRepository;
pub use manager::DbManager;
pub use meeting_lead_repository::SqlCipherMeetingLeadRepository;

use chrono::{DateTime, Utc};
use leadflow_domain::LeadflowError;
use rusqlite::types::Type;
use tokio::task;

/// Unix seconds read from `column` as a UTC timestamp.
pub(crate) fn from_unix(column: usize, secs: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            Type::Integer,
            format!("timestamp out of range: {secs}").into(),
        )
    })
}

pub(crate) fn from_unix_opt(
    column: usize,
    secs: Option<i64>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    secs.map(|s| from_unix(column, s)).transpose()
}

pub(crate) fn map_join_error(err: task::JoinError) -> LeadflowError {
    if err.is_cancelled() {
        LeadflowError::Internal("blocking repository task cancelled".into())
    } else {
        LeadflowError::Internal(format!("blocking repository task failed: {err}"))
    }
}
