//! SQLCipher-backed calendar credential repository.
//!
//! One row per user in `calendar_credentials`. Tokens live only in this
//! table and are protected at rest by SQLCipher.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadflow_core::CredentialRepository;
use leadflow_domain::constants::DEFAULT_CALENDAR_ID;
use leadflow_domain::{CalendarCredential, CredentialGrant, Result as DomainResult, TokenGrant};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;
use tracing::{debug, instrument};

use super::manager::DbManager;
use super::{from_unix, from_unix_opt, map_join_error};
use crate::errors::InfraError;

const CREDENTIAL_COLUMNS: &str = "user_id, access_token, refresh_token, token_expiry,
    provider_email, enabled, last_sync, calendar_id, created_at, updated_at";

/// SQLCipher implementation of [`CredentialRepository`].
pub struct SqlCipherCredentialRepository {
    db: Arc<DbManager>,
}

impl SqlCipherCredentialRepository {
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
impl CredentialRepository for SqlCipherCredentialRepository {
    async fn find_by_user(&self, user_id: &str) -> DomainResult<Option<CalendarCredential>> {
        let user_id = user_id.to_string();
        self.run(move |conn| select_credential(conn, &user_id)).await
    }

    #[instrument(skip(self, grant), fields(has_refresh_token = grant.refresh_token.is_some()))]
    async fn upsert_from_exchange(&self, grant: CredentialGrant) -> DomainResult<CalendarCredential> {
        self.run(move |conn| {
            let now = Utc::now().timestamp();
            conn.execute(
                "INSERT INTO calendar_credentials (
                    user_id, access_token, refresh_token, token_expiry, provider_email,
                    enabled, last_sync, calendar_id, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, 1, NULL, ?6, ?7, ?7)
                ON CONFLICT(user_id) DO UPDATE SET
                    access_token = excluded.access_token,
                    refresh_token = COALESCE(excluded.refresh_token, calendar_credentials.refresh_token),
                    token_expiry = excluded.token_expiry,
                    provider_email = COALESCE(excluded.provider_email, calendar_credentials.provider_email),
                    enabled = 1,
                    updated_at = excluded.updated_at",
                params![
                    grant.user_id,
                    grant.access_token,
                    grant.refresh_token,
                    grant.token_expiry.timestamp(),
                    grant.provider_email,
                    DEFAULT_CALENDAR_ID,
                    now,
                ],
            )
            .map_err(InfraError::from)?;

            debug!("credential stored after exchange");
            select_credential(conn, &grant.user_id)?.ok_or_else(|| {
                leadflow_domain::LeadflowError::Store("credential missing after upsert".into())
            })
        })
        .await
    }

    async fn update_tokens(&self, user_id: &str, grant: &TokenGrant) -> DomainResult<()> {
        let user_id = user_id.to_string();
        let grant = grant.clone();
        self.run(move |conn| {
            conn.execute(
                "UPDATE calendar_credentials
                 SET access_token = ?2,
                     refresh_token = COALESCE(?3, refresh_token),
                     token_expiry = ?4,
                     updated_at = ?5
                 WHERE user_id = ?1",
                params![
                    user_id,
                    grant.access_token,
                    grant.refresh_token,
                    grant.expires_at.timestamp(),
                    Utc::now().timestamp(),
                ],
            )
            .map_err(InfraError::from)?;
            Ok(())
        })
        .await
    }

    async fn set_enabled(&self, user_id: &str, enabled: bool) -> DomainResult<()> {
        let user_id = user_id.to_string();
        self.run(move |conn| {
            conn.execute(
                "UPDATE calendar_credentials SET enabled = ?2, updated_at = ?3 WHERE user_id = ?1",
                params![user_id, enabled, Utc::now().timestamp()],
            )
            .map_err(InfraError::from)?;
            Ok(())
        })
        .await
    }

    async fn touch_last_sync(&self, user_id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let user_id = user_id.to_string();
        self.run(move |conn| {
            conn.execute(
                "UPDATE calendar_credentials SET last_sync = ?2, updated_at = ?3 WHERE user_id = ?1",
                params![user_id, at.timestamp(), Utc::now().timestamp()],
            )
            .map_err(InfraError::from)?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, user_id: &str) -> DomainResult<bool> {
        let user_id = user_id.to_string();
        self.run(move |conn| {
            let removed = conn
                .execute("DELETE FROM calendar_credentials WHERE user_id = ?1", params![user_id])
                .map_err(InfraError::from)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn list_enabled_user_ids(&self) -> DomainResult<Vec<String>> {
        self.run(|conn| {
            let mut stmt = conn
                .prepare("SELECT user_id FROM calendar_credentials WHERE enabled = 1 ORDER BY user_id")
                .map_err(InfraError::from)?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
                .map_err(InfraError::from)?;
            Ok(ids)
        })
        .await
    }
}

fn select_credential(
    conn: &rusqlite::Connection,
    user_id: &str,
) -> DomainResult<Option<CalendarCredential>> {
    let sql = format!("SELECT {CREDENTIAL_COLUMNS} FROM calendar_credentials WHERE user_id = ?1");
    conn.query_row(&sql, params![user_id], map_credential_row)
        .optional()
        .map_err(|e| InfraError::from(e).into())
}

fn map_credential_row(row: &Row<'_>) -> rusqlite::Result<CalendarCredential> {
    Ok(CalendarCredential {
        user_id: row.get(0)?,
        access_token: row.get(1)?,
        refresh_token: row.get(2)?,
        token_expiry: from_unix_opt(3, row.get(3)?)?,
        provider_email: row.get(4)?,
        enabled: row.get(5)?,
        last_sync: from_unix_opt(6, row.get(6)?)?,
        calendar_id: row.get(7)?,
        created_at: from_unix(8, row.get(8)?)?,
        updated_at: from_unix(9, row.get(9)?)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    use super::*;

    const TEST_KEY: &str = "test_key_64_chars_long_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    fn setup() -> (TempDir, SqlCipherCredentialRepository) {
        let dir = TempDir::new().unwrap();
        let db = DbManager::new(dir.path().join("creds.db"), 2, Some(TEST_KEY)).unwrap();
        db.run_migrations().unwrap();
        (dir, SqlCipherCredentialRepository::new(Arc::new(db)))
    }

    fn grant(refresh: Option<&str>, email: Option<&str>) -> CredentialGrant {
        CredentialGrant {
            user_id: "user-1".into(),
            access_token: "access-1".into(),
            refresh_token: refresh.map(str::to_string),
            token_expiry: Utc.timestamp_opt(1_900_000_000, 0).unwrap(),
            provider_email: email.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn upsert_creates_enabled_primary_credential() {
        let (_dir, repo) = setup();

        let stored = repo.upsert_from_exchange(grant(Some("r1"), Some("ana@example.com"))).await.unwrap();

        assert!(stored.enabled);
        assert_eq!(stored.calendar_id, "primary");
        assert_eq!(stored.refresh_token.as_deref(), Some("r1"));
        assert_eq!(stored.token_expiry, Some(Utc.timestamp_opt(1_900_000_000, 0).unwrap()));
        assert!(stored.last_sync.is_none());
    }

    /// Validates re-authorization updates the existing row in place.
    ///
    /// Assertions:
    /// - Ensures a disabled record comes back enabled.
    /// - Ensures a missing refresh token and email keep the stored values.
    #[tokio::test]
    async fn reexchange_keeps_refresh_token_and_reenables() {
        let (_dir, repo) = setup();
        repo.upsert_from_exchange(grant(Some("r1"), Some("ana@example.com"))).await.unwrap();
        repo.set_enabled("user-1", false).await.unwrap();

        let stored = repo.upsert_from_exchange(grant(None, None)).await.unwrap();

        assert!(stored.enabled);
        assert_eq!(stored.refresh_token.as_deref(), Some("r1"));
        assert_eq!(stored.provider_email.as_deref(), Some("ana@example.com"));
    }

    #[tokio::test]
    async fn update_tokens_keeps_enabled_flag_and_refresh_token() {
        let (_dir, repo) = setup();
        repo.upsert_from_exchange(grant(Some("r1"), None)).await.unwrap();
        let expires_at = Utc.timestamp_opt(1_950_000_000, 0).unwrap();

        repo.update_tokens(
            "user-1",
            &TokenGrant { access_token: "access-2".into(), refresh_token: None, expires_at },
        )
        .await
        .unwrap();

        let stored = repo.find_by_user("user-1").await.unwrap().unwrap();
        assert_eq!(stored.access_token, "access-2");
        assert_eq!(stored.refresh_token.as_deref(), Some("r1"));
        assert_eq!(stored.token_expiry, Some(expires_at));
        assert!(stored.enabled);
    }

    #[tokio::test]
    async fn enabled_listing_and_last_sync() {
        let (_dir, repo) = setup();
        repo.upsert_from_exchange(grant(Some("r1"), None)).await.unwrap();
        let mut other = grant(Some("r2"), None);
        other.user_id = "user-2".into();
        repo.upsert_from_exchange(other).await.unwrap();
        repo.set_enabled("user-2", false).await.unwrap();

        let at = Utc.timestamp_opt(1_800_000_000, 0).unwrap();
        repo.touch_last_sync("user-1", at).await.unwrap();

        assert_eq!(repo.list_enabled_user_ids().await.unwrap(), vec!["user-1".to_string()]);
        let stored = repo.find_by_user("user-1").await.unwrap().unwrap();
        assert_eq!(stored.last_sync, Some(at));
        assert!(stored.updated_at >= stored.created_at);
        assert!(stored.updated_at <= Utc::now() + Duration::seconds(1));
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let (_dir, repo) = setup();
        repo.upsert_from_exchange(grant(Some("r1"), None)).await.unwrap();

        assert!(repo.delete("user-1").await.unwrap());
        assert!(!repo.delete("user-1").await.unwrap());
        assert!(repo.find_by_user("user-1").await.unwrap().is_none());
    }
}
