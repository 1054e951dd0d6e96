//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

// Token lifecycle
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;
pub const PENDING_AUTHORIZATION_TTL_SECS: u64 = 600;
pub const DEFAULT_CALENDAR_ID: &str = "primary";

// Sync window and paging
pub const SYNC_LOOKBACK_DAYS: i64 = 7;
pub const SYNC_LOOKAHEAD_DAYS: i64 = 30;
pub const SYNC_MAX_RESULTS: u32 = 250;

// Sync scheduling
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;
pub const SYNC_DEBOUNCE_SLACK_SECS: u64 = 10;
pub const DEFAULT_SYNC_TICK_CRON: &str = "0 * * * * *";

// Classification and enrichment
pub const MIN_CLIENT_NAME_CHARS: usize = 2;
pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const DESCRIPTION_TRUNCATE_SUFFIX: &str = "...";
