//! GitHub API rate-limit bookkeeping
//!
//! Every successful API response updates a shared snapshot with the last-seen
//! `X-RateLimit-*` headers. The snapshot is purely observational: it is
//! printed once at the end of a run and never used to throttle requests.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::fmt;
use std::sync::Mutex;

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Last-seen rate-limit values, verbatim from the response headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    pub limit: Option<String>,
    pub remaining: Option<String>,
    /// Unix timestamp (seconds) as sent by the API
    pub reset: Option<String>,
}

impl RateLimitSnapshot {
    /// Extract the three rate-limit headers; missing or non-ASCII headers map to `None`
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        Self {
            limit: get(LIMIT_HEADER),
            remaining: get(REMAINING_HEADER),
            reset: get(RESET_HEADER),
        }
    }

    /// True when no rate-limit header has ever been observed
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.remaining.is_none() && self.reset.is_none()
    }

    /// Reset time, when the header parses as unix seconds
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        self.reset
            .as_deref()
            .and_then(|reset| reset.trim().parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

impl fmt::Display for RateLimitSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let limit = self.limit.as_deref().unwrap_or_default();
        let remaining = self.remaining.as_deref().unwrap_or_default();

        match self.reset_at() {
            Some(reset_at) => write!(
                f,
                "Rate Limit: {}, Remaining: {}, Reset At: {}",
                limit, remaining, reset_at
            ),
            None => write!(
                f,
                "Rate Limit: {}, Remaining: {}, Reset At: {}",
                limit,
                remaining,
                self.reset.as_deref().unwrap_or_default()
            ),
        }
    }
}

/// Shared, mutex-guarded snapshot updated after every successful API response
///
/// Passed by reference into each client call so concurrent member fetches
/// can record their headers safely. Last write wins.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    snapshot: Mutex<RateLimitSnapshot>,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the snapshot with the headers of the latest response
    pub fn record(&self, headers: &HeaderMap) {
        self.replace(RateLimitSnapshot::from_headers(headers));
    }

    /// Overwrite the snapshot with an already-extracted value
    pub fn replace(&self, snapshot: RateLimitSnapshot) {
        let mut guard = self
            .snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = snapshot;
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> RateLimitSnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
