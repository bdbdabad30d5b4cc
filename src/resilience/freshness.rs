use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const STALE_AFTER_MINUTES: i64 = 10;
const OFFLINE_AFTER_MINUTES: i64 = 30;
const OFFLINE_AFTER_FAILURES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreshnessState {
    Fresh,
    Stale,
    Offline,
}

impl FreshnessState {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FreshnessState::Fresh => "fresh",
            FreshnessState::Stale => "stale",
            FreshnessState::Offline => "offline",
        }
    }
}

/// Classifies the data currently on screen. Silent refresh failures keep old
/// data visible, so age and failure count both push it towards offline.
#[must_use]
pub fn evaluate_freshness(
    last_success: Option<DateTime<Utc>>,
    consecutive_failures: u32,
    now: DateTime<Utc>,
) -> FreshnessState {
    let Some(last_success) = last_success else {
        return if consecutive_failures >= OFFLINE_AFTER_FAILURES {
            FreshnessState::Offline
        } else {
            FreshnessState::Stale
        };
    };

    let age = now - last_success;

    if age > Duration::minutes(OFFLINE_AFTER_MINUTES)
        || consecutive_failures >= OFFLINE_AFTER_FAILURES
    {
        FreshnessState::Offline
    } else if age > Duration::minutes(STALE_AFTER_MINUTES) || consecutive_failures >= 1 {
        FreshnessState::Stale
    } else {
        FreshnessState::Fresh
    }
}
