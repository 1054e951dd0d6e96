//! SQLCipher connection pool
//!
//! r2d2 pool whose connection initializer applies the key and pragmas, so
//! every pooled connection is ready for queries.

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{debug, info, instrument, warn};

use super::cipher::{configure_sqlcipher, verify_encryption, SqlCipherConfig};
use super::config::SqlCipherPoolConfig;
use super::pragmas::apply_connection_pragmas;
use crate::storage::error::{looks_like_wrong_key, StorageError, StorageResult};

/// A pooled, keyed SQLCipher connection. Derefs to [`rusqlite::Connection`].
pub type SqlCipherConnection = PooledConnection<SqliteConnectionManager>;

/// SQLCipher connection pool
#[derive(Debug)]
pub struct SqlCipherPool {
    pool: Pool<SqliteConnectionManager>,
    config: SqlCipherPoolConfig,
}

impl SqlCipherPool {
    /// Create a new SQLCipher connection pool
    ///
    /// Builds the pool, then checks out one connection to prove the key
    /// opens the file.
    ///
    /// # Errors
    /// Returns `WrongKeyOrNotEncrypted` when the key does not match, or
    /// `Connection` when the pool cannot be built.
    #[instrument(skip(encryption_key), fields(db_path = ?path, pool_size = config.max_size))]
    pub fn new(
        path: &Path,
        encryption_key: String,
        config: SqlCipherPoolConfig,
    ) -> StorageResult<Self> {
        if config.max_size == 0 {
            return Err(StorageError::InvalidConfig("pool size must be at least 1".into()));
        }

        let cipher_config = SqlCipherConfig::new(encryption_key);
        let pool_config = config.clone();

        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            configure_sqlcipher(conn, &cipher_config)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            apply_connection_pragmas(conn, &pool_config)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            Ok(())
        });

        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|e| classify_pool_error("Failed to create pool", &e))?;

        {
            let conn = pool.get().map_err(|e| classify_pool_error("Failed to open test connection", &e))?;
            verify_encryption(&conn)?;
            debug!("Encryption verified successfully");
        }

        info!(max_connections = config.max_size, "SQLCipher pool created");
        Ok(Self { pool, config })
    }

    /// Acquire a connection from the pool.
    ///
    /// # Errors
    /// Returns `Timeout` when the pool stays exhausted past the configured
    /// connection timeout.
    pub fn get_sqlcipher_connection(&self) -> StorageResult<SqlCipherConnection> {
        self.pool.get().map_err(|e| {
            let message = e.to_string();
            if message.to_ascii_lowercase().contains("timed out") {
                warn!(timeout = ?self.config.connection_timeout, "Connection acquisition timed out");
                StorageError::Timeout(self.config.connection_timeout.as_secs())
            } else {
                warn!(error = %message, "Connection error");
                StorageError::Connection(format!("Failed to get connection: {message}"))
            }
        })
    }

    /// Maximum number of pooled connections.
    #[must_use]
    pub const fn max_size(&self) -> u32 {
        self.config.max_size
    }
}

fn classify_pool_error(context: &str, err: &r2d2::Error) -> StorageError {
    let message = err.to_string();
    warn!(error = %message, "{context}");
    if looks_like_wrong_key(&message) {
        StorageError::WrongKeyOrNotEncrypted
    } else {
        StorageError::Connection(format!("{context}: {message}"))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for storage::sqlcipher::pool.
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;

    fn test_key() -> String {
        "test_key_64_chars_long_aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_string()
    }

    #[test]
    fn test_pool_creation() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let pool = SqlCipherPool::new(&db_path, test_key(), SqlCipherPoolConfig::default()).unwrap();
        let conn = pool.get_sqlcipher_connection().unwrap();

        conn.execute("CREATE TABLE test (id INTEGER PRIMARY KEY)", []).unwrap();
        assert_eq!(pool.max_size(), 10);
    }

    #[test]
    fn test_zero_pool_size_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = SqlCipherPoolConfig { max_size: 0, ..SqlCipherPoolConfig::default() };

        let result = SqlCipherPool::new(&temp_dir.path().join("test.db"), test_key(), config);
        assert!(matches!(result, Err(StorageError::InvalidConfig(_))));
    }

    /// Validates concurrent writers through the pool.
    ///
    /// Assertions:
    /// - Confirms all five threaded inserts are visible afterwards.
    #[test]
    fn test_concurrent_connections() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = Arc::new(
            SqlCipherPool::new(&db_path, test_key(), SqlCipherPoolConfig::default()).unwrap(),
        );

        pool.get_sqlcipher_connection()
            .unwrap()
            .execute("CREATE TABLE test (id INTEGER PRIMARY KEY, value TEXT)", [])
            .unwrap();

        let handles: Vec<_> = (0..5)
            .map(|i| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    let conn = pool.get_sqlcipher_connection().unwrap();
                    conn.execute("INSERT INTO test (value) VALUES (?1)", [format!("v{i}")])
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let count: i64 = pool
            .get_sqlcipher_connection()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM test", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 5);
    }
}
