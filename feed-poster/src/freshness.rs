use chrono::{DateTime, Utc};
use std::time::Duration;

/// Outcome of checking one feed item against the last run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Dated before the last successful run.
    Stale,
    /// Dated within the feed's jitter tolerance of the fetch time, so the
    /// timestamp most likely tracks the fetch rather than a content change.
    TooCloseToFetchTime,
    Fresh,
}

impl Freshness {
    pub fn is_fresh(self) -> bool {
        self == Freshness::Fresh
    }
}

/// Classify an item. Rules apply in order:
///
/// 1. `item_time < last_run` and not debugging: [`Freshness::Stale`]
/// 2. `current_time - item_time <= jitter`: [`Freshness::TooCloseToFetchTime`]
/// 3. otherwise [`Freshness::Fresh`]
///
/// A `last_run` of `None` (never run before) never suppresses under rule 1.
pub fn classify(
    item_time: DateTime<Utc>,
    last_run: Option<DateTime<Utc>>,
    current_time: DateTime<Utc>,
    jitter: Duration,
    debug: bool,
) -> Freshness {
    if !debug && last_run.is_some_and(|last| item_time < last) {
        return Freshness::Stale;
    }

    // Items dated in the future have a negative age and always count as too close.
    let within_jitter = match current_time.signed_duration_since(item_time).to_std() {
        Ok(age) => age <= jitter,
        Err(_) => true,
    };

    if within_jitter {
        Freshness::TooCloseToFetchTime
    } else {
        Freshness::Fresh
    }
}
