//! SQLCipher configuration
//!
//! Applies the encryption pragmas that must run before any other statement
//! on a freshly opened connection.

use rusqlite::Connection;
use tracing::{debug, error};

use crate::storage::error::{looks_like_wrong_key, StorageError, StorageResult};

/// SQLCipher configuration
#[derive(Clone)]
pub struct SqlCipherConfig {
    key: String,

    /// Cipher compatibility version (default: 4 for SQLCipher 4.x)
    pub cipher_compatibility: i32,
}

// Custom Debug impl to avoid exposing the key
impl std::fmt::Debug for SqlCipherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlCipherConfig")
            .field("key", &"***")
            .field("cipher_compatibility", &self.cipher_compatibility)
            .finish()
    }
}

impl SqlCipherConfig {
    /// Create default configuration with the given key
    #[must_use]
    pub const fn new(key: String) -> Self {
        Self { key, cipher_compatibility: 4 }
    }
}

/// Configure SQLCipher for a connection
///
/// ```sql
/// PRAGMA key = '<encryption_key>';
/// PRAGMA cipher_compatibility = 4;
/// ```
///
/// # Errors
/// Returns an error if any pragma fails to apply
pub fn configure_sqlcipher(conn: &Connection, config: &SqlCipherConfig) -> StorageResult<()> {
    conn.pragma_update(None, "key", &config.key).map_err(|e| {
        error!(error = %e, "SQLCipher key setup failed");
        if looks_like_wrong_key(&e.to_string()) {
            StorageError::WrongKeyOrNotEncrypted
        } else {
            StorageError::Encryption(format!("Failed to set encryption key: {e}"))
        }
    })?;

    conn.pragma_update(None, "cipher_compatibility", config.cipher_compatibility).map_err(|e| {
        error!(error = %e, "Failed to set cipher_compatibility");
        StorageError::Encryption(format!("Failed to set cipher_compatibility: {e}"))
    })?;

    debug!("SQLCipher configuration applied");
    Ok(())
}

/// Verify that the key opens the database
///
/// Reading `sqlite_master` forces SQLCipher to decrypt the first page.
///
/// # Errors
/// Returns `WrongKeyOrNotEncrypted` if the key is wrong or the database
/// isn't encrypted
pub fn verify_encryption(conn: &Connection) -> StorageResult<()> {
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(())).map_err(|e| {
        error!(error = %e, "Encryption verification failed");
        if looks_like_wrong_key(&e.to_string()) {
            StorageError::WrongKeyOrNotEncrypted
        } else {
            StorageError::from(e)
        }
    })
}
