use chrono::{Duration, TimeZone, Utc};
use feed_poster::{classify, Freshness};
use std::time::Duration as StdDuration;

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

#[test]
fn item_before_last_run_is_stale() {
    let last_run = t0();
    let now = t0() + Duration::hours(2);
    let item_time = t0() - Duration::hours(1);

    assert_eq!(
        classify(item_time, Some(last_run), now, StdDuration::ZERO, false),
        Freshness::Stale
    );
}

#[test]
fn stale_wins_regardless_of_jitter() {
    let now = t0() + Duration::hours(2);
    let item_time = t0() - Duration::seconds(1);

    for jitter in [0, 60, 3_600, 86_400 * 365] {
        assert_eq!(
            classify(item_time, Some(t0()), now, StdDuration::from_secs(jitter), false),
            Freshness::Stale,
            "jitter {}s",
            jitter
        );
    }
}

#[test]
fn item_within_jitter_is_too_close() {
    let now = t0() + Duration::hours(1);
    let item_time = now - Duration::seconds(30);

    assert_eq!(
        classify(item_time, Some(t0()), now, StdDuration::from_secs(60), false),
        Freshness::TooCloseToFetchTime
    );
}

#[test]
fn jitter_boundary_is_inclusive() {
    let now = t0() + Duration::hours(1);
    let item_time = now - Duration::seconds(60);

    assert_eq!(
        classify(item_time, Some(t0()), now, StdDuration::from_secs(60), false),
        Freshness::TooCloseToFetchTime
    );
    assert_eq!(
        classify(item_time - Duration::milliseconds(1), Some(t0()), now, StdDuration::from_secs(60), false),
        Freshness::Fresh
    );
}

#[test]
fn item_outside_jitter_and_after_last_run_is_fresh() {
    let now = t0() + Duration::hours(1);
    let item_time = now - Duration::seconds(90);

    let result = classify(item_time, Some(t0()), now, StdDuration::from_secs(60), false);
    assert_eq!(result, Freshness::Fresh);
    assert!(result.is_fresh());
}

#[test]
fn zero_jitter_only_suppresses_simultaneous_timestamps() {
    let now = t0() + Duration::hours(1);

    assert_eq!(
        classify(now, Some(t0()), now, StdDuration::ZERO, false),
        Freshness::TooCloseToFetchTime
    );
    assert_eq!(
        classify(now - Duration::milliseconds(1), Some(t0()), now, StdDuration::ZERO, false),
        Freshness::Fresh
    );
}

#[test]
fn future_dated_item_is_too_close() {
    let now = t0() + Duration::hours(1);

    assert_eq!(
        classify(now + Duration::minutes(5), Some(t0()), now, StdDuration::ZERO, false),
        Freshness::TooCloseToFetchTime
    );
}

#[test]
fn debug_bypasses_staleness() {
    let now = t0() + Duration::hours(2);
    let old_item = t0() - Duration::hours(1);

    assert_eq!(
        classify(old_item, Some(t0()), now, StdDuration::from_secs(60), true),
        Freshness::Fresh
    );
    // Jitter still applies in debug mode.
    assert_eq!(
        classify(now - Duration::seconds(10), Some(t0()), now, StdDuration::from_secs(60), true),
        Freshness::TooCloseToFetchTime
    );
}

#[test]
fn first_run_never_reports_stale() {
    let now = t0();
    let ancient = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();

    assert_eq!(
        classify(ancient, None, now, StdDuration::from_secs(600), false),
        Freshness::Fresh
    );
    assert_eq!(
        classify(now - Duration::seconds(5), None, now, StdDuration::from_secs(600), false),
        Freshness::TooCloseToFetchTime
    );
}

#[test]
fn classification_is_deterministic() {
    let now = t0() + Duration::hours(1);
    let cases = [
        (t0() - Duration::hours(1), false),
        (now - Duration::seconds(30), false),
        (now - Duration::seconds(90), false),
        (t0() - Duration::hours(1), true),
    ];

    for (item_time, debug) in cases {
        let first = classify(item_time, Some(t0()), now, StdDuration::from_secs(60), debug);
        let second = classify(item_time, Some(t0()), now, StdDuration::from_secs(60), debug);
        assert_eq!(first, second);
    }
}
