use chrono::{TimeDelta, TimeZone, Utc};
use gemini_bloggen::models::{Granularity, ModelQuota, QuotaCategory};
use gemini_bloggen::tracker::{QuotaDecision, QuotaTracker};

fn quota(model: &str, rpm: u32, tpm: u64, rpd: u32) -> ModelQuota {
    ModelQuota {
        model: model.to_string(),
        category: QuotaCategory::Text,
        requests_per_minute: rpm,
        tokens_per_minute: tpm,
        requests_per_day: rpd,
    }
}

#[test]
fn test_rpm_window_admits_exactly_n_calls() {
    let tracker = QuotaTracker::in_memory().unwrap();
    let quota = quota("gemini-2.0-flash", 10, 1_000_000, 1_500);
    let now = Utc.with_ymd_and_hms(2026, 8, 29, 15, 0, 0).unwrap();

    for i in 0..10 {
        assert_eq!(
            tracker.try_acquire_at(&quota, 2_500, now).unwrap(),
            QuotaDecision::Allowed,
            "call {} should be allowed",
            i + 1
        );
    }

    match tracker.try_acquire_at(&quota, 2_500, now).unwrap() {
        QuotaDecision::Denied {
            reason,
            retry_after_secs,
        } => {
            assert!(reason.contains("requests-per-minute"));
            assert!(retry_after_secs > 0 && retry_after_secs <= 60);
        }
        QuotaDecision::Allowed => panic!("11th call should be denied"),
    }
}

#[test]
fn test_window_boundary_gives_fresh_counter() {
    let tracker = QuotaTracker::in_memory().unwrap();
    let quota = quota("gemini-2.5-flash", 2, 1_000_000, 1_000);
    let now = Utc.with_ymd_and_hms(2026, 8, 29, 15, 0, 0).unwrap();

    assert_eq!(
        tracker.try_acquire_at(&quota, 100, now).unwrap(),
        QuotaDecision::Allowed
    );
    assert_eq!(
        tracker.try_acquire_at(&quota, 100, now).unwrap(),
        QuotaDecision::Allowed
    );
    assert!(matches!(
        tracker.try_acquire_at(&quota, 100, now).unwrap(),
        QuotaDecision::Denied { .. }
    ));

    // window_start + duration + epsilon must see a zero counter
    let just_past = now + TimeDelta::milliseconds(60_001);
    assert_eq!(
        tracker.try_acquire_at(&quota, 100, just_past).unwrap(),
        QuotaDecision::Allowed
    );
}

#[test]
fn test_daily_budget_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("quota.db");
    let quota = quota("gemini-2.5-pro", 100, 1_000_000, 5);
    let now = Utc.with_ymd_and_hms(2026, 8, 29, 9, 0, 0).unwrap();

    {
        let tracker = QuotaTracker::open(&db_path).unwrap();
        for _ in 0..3 {
            assert_eq!(
                tracker.try_acquire_at(&quota, 100, now).unwrap(),
                QuotaDecision::Allowed
            );
        }
    }

    // A later process invocation sees the same daily consumption
    let tracker = QuotaTracker::open(&db_path).unwrap();
    let day = tracker
        .usage("gemini-2.5-pro", Granularity::Day)
        .unwrap()
        .unwrap();
    assert_eq!(day.request_count, 3);

    // Two more fit (in a fresh minute), the sixth of the day does not
    let later = now + TimeDelta::minutes(5);
    assert_eq!(
        tracker.try_acquire_at(&quota, 100, later).unwrap(),
        QuotaDecision::Allowed
    );
    assert_eq!(
        tracker.try_acquire_at(&quota, 100, later).unwrap(),
        QuotaDecision::Allowed
    );
    match tracker.try_acquire_at(&quota, 100, later).unwrap() {
        QuotaDecision::Denied { reason, .. } => assert!(reason.contains("requests-per-day")),
        QuotaDecision::Allowed => panic!("daily budget should be exhausted"),
    }
}

#[test]
fn test_models_tracked_independently() {
    let tracker = QuotaTracker::in_memory().unwrap();
    let small = quota("gemini-2.5-pro", 1, 1_000_000, 100);
    let large = quota("gemini-2.0-flash", 10, 1_000_000, 1_500);
    let now = Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap();

    assert_eq!(
        tracker.try_acquire_at(&small, 100, now).unwrap(),
        QuotaDecision::Allowed
    );
    assert!(matches!(
        tracker.try_acquire_at(&small, 100, now).unwrap(),
        QuotaDecision::Denied { .. }
    ));
    // Exhausting one model leaves the other untouched
    assert_eq!(
        tracker.try_acquire_at(&large, 100, now).unwrap(),
        QuotaDecision::Allowed
    );
}
