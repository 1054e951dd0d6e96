//! Tracing subscriber setup and request-outcome logging

use std::time::Duration;

use leadflow_domain::LeadflowError;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info,leadflow=debug";

/// Environment variable selecting the output format (`json` or plain text).
pub const LOG_FORMAT_ENV: &str = "LEADFLOW_LOG_FORMAT";

/// Install the global subscriber.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = wants_json(std::env::var(LOG_FORMAT_ENV).ok().as_deref());

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_current_span(false)))
        .with((!json).then(fmt::layer))
        .try_init()
}

fn wants_json(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.trim().eq_ignore_ascii_case("json"))
}

/// Log the outcome of a request with structured fields.
///
/// `operation` must be a stable identifier without user data.
#[inline]
pub fn log_request_outcome(
    operation: &str,
    elapsed: Duration,
    outcome: Result<(), &LeadflowError>,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(()) => info!(operation, duration_ms, "request_success"),
        Err(err) => warn!(operation, duration_ms, code = err.code(), "request_failure"),
    }
}
