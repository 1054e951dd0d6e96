//! Identifier redaction for log output.
//!
//! User identifiers and provider emails are replaced with a short salted
//! SHA-256 digest before they reach structured logs.

use sha2::{Digest, Sha256};

const REDACTION_SALT: &[u8] = b"leadflow-log-redaction-salt";

/// Replace an identifier with a stable, non-reversible tag.
///
/// The same input always yields the same tag so log lines for one user can
/// still be correlated.
#[must_use]
pub fn redact_identifier(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(REDACTION_SALT);
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    format!("id_hash={}", hex::encode(&digest[..8]))
}
