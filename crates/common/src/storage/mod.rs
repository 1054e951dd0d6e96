//! Storage primitives for encrypted databases
//!
//! An r2d2 pool of SQLCipher connections. Schema ownership stays with the
//! application; this module only opens, keys and tunes connections.

pub mod error;
pub mod sqlcipher;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use sqlcipher::{
    apply_connection_pragmas, SqlCipherConnection, SqlCipherPool, SqlCipherPoolConfig,
};
