//! Conversions from external infrastructure errors into domain errors.

use leadflow_common::auth::OAuthClientError;
use leadflow_common::storage::StorageError;
use leadflow_domain::LeadflowError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub LeadflowError);

impl From<InfraError> for LeadflowError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LeadflowError> for InfraError {
    fn from(value: LeadflowError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoLeadflowError {
    fn into_leadflow(self) -> LeadflowError;
}

fn looks_like_wrong_key(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("not a database") || lower.contains("encrypted")
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → LeadflowError */
/* -------------------------------------------------------------------------- */

impl IntoLeadflowError for SqlError {
    fn into_leadflow(self) -> LeadflowError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => LeadflowError::Store("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        LeadflowError::Store("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        LeadflowError::Store("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        LeadflowError::Store("foreign key constraint violation".into())
                    }
                    (_, _) if looks_like_wrong_key(&message) => LeadflowError::Config(
                        "SQLCipher key rejected or database not encrypted".into(),
                    ),
                    _ => LeadflowError::Store(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => LeadflowError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                LeadflowError::Store(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                LeadflowError::Store(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => LeadflowError::Store("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidPath(path) => LeadflowError::Store(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => LeadflowError::Store(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_leadflow())
    }
}

/* -------------------------------------------------------------------------- */
/* StorageError → LeadflowError */
/* -------------------------------------------------------------------------- */

impl IntoLeadflowError for StorageError {
    fn into_leadflow(self) -> LeadflowError {
        match self {
            StorageError::Rusqlite(err) => err.into_leadflow(),
            StorageError::WrongKeyOrNotEncrypted => {
                LeadflowError::Config("SQLCipher key rejected or database not encrypted".into())
            }
            StorageError::InvalidConfig(msg) => LeadflowError::Config(msg),
            other => LeadflowError::Store(other.to_string()),
        }
    }
}

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        InfraError(value.into_leadflow())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → LeadflowError */
/* -------------------------------------------------------------------------- */

impl IntoLeadflowError for HttpError {
    fn into_leadflow(self) -> LeadflowError {
        if self.is_timeout() {
            return LeadflowError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return LeadflowError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                404 => LeadflowError::NotFound(message),
                _ => LeadflowError::Network(message),
            };
        }

        LeadflowError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_leadflow())
    }
}

/* -------------------------------------------------------------------------- */
/* OAuthClientError → LeadflowError */
/* -------------------------------------------------------------------------- */

impl IntoLeadflowError for OAuthClientError {
    fn into_leadflow(self) -> LeadflowError {
        match self {
            OAuthClientError::RequestFailed(err) => err.into_leadflow(),
            OAuthClientError::ConfigError(msg) => LeadflowError::Config(msg),
            other => LeadflowError::Internal(other.to_string()),
        }
    }
}

impl From<OAuthClientError> for InfraError {
    fn from(value: OAuthClientError) -> Self {
        InfraError(value.into_leadflow())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
