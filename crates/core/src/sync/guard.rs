//! Per-user minimum-interval guard
//!
//! A sync is due when neither the persisted `last_sync` nor the most recent
//! local trigger falls inside the debounce window (`interval - slack`).
//! The slack absorbs timer jitter so a periodic tick landing a few seconds
//! early still counts.
//!
//! This is a cooperative rate limiter, not a lock: the ingestion upsert is
//! idempotent, so an overlapping run is harmless.

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use leadflow_domain::constants::{DEFAULT_SYNC_INTERVAL_SECS, SYNC_DEBOUNCE_SLACK_SECS};

#[derive(Debug)]
pub struct SyncGuard {
    window: Duration,
    last_triggers: DashMap<String, DateTime<Utc>>,
}

impl Default for SyncGuard {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_INTERVAL_SECS)
    }
}

impl SyncGuard {
    #[must_use]
    pub fn new(interval_secs: u64) -> Self {
        let window_secs = interval_secs.saturating_sub(SYNC_DEBOUNCE_SLACK_SECS);
        Self {
            window: Duration::seconds(i64::try_from(window_secs).unwrap_or(i64::MAX)),
            last_triggers: DashMap::new(),
        }
    }

    /// Whether a sync would be due at `now`, without recording anything.
    #[must_use]
    pub fn is_due(&self, user_id: &str, last_sync: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let last_trigger = self.last_triggers.get(user_id).map(|t| *t);
        self.due(latest(last_sync, last_trigger), now)
    }

    /// Atomically check whether a sync is due and, if so, record `now` as
    /// the user's last trigger.
    pub fn try_acquire(
        &self,
        user_id: &str,
        last_sync: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        match self.last_triggers.entry(user_id.to_string()) {
            Entry::Occupied(mut entry) => {
                if self.due(latest(last_sync, Some(*entry.get())), now) {
                    entry.insert(now);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                if self.due(last_sync, now) {
                    entry.insert(now);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record an unconditional trigger (explicit user request).
    pub fn record(&self, user_id: &str, now: DateTime<Utc>) {
        self.last_triggers.insert(user_id.to_string(), now);
    }

    /// Drop local state for a user, e.g. after disconnect.
    pub fn forget(&self, user_id: &str) {
        self.last_triggers.remove(user_id);
    }

    fn due(&self, latest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        latest.map_or(true, |at| now - at >= self.window)
    }
}

fn latest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
