mod common;

use serial_test::serial;
use std::time::Duration;

use gemini_bloggen::client::GenerationClient;
use gemini_bloggen::models::{Granularity, ModelQuota, QuotaCategory};
use gemini_bloggen::tracker::{QuotaDecision, QuotaTracker};
use gemini_bloggen::utils::estimate_tokens;

fn flash_quota() -> ModelQuota {
    ModelQuota {
        model: "gemini-2.0-flash".to_string(),
        category: QuotaCategory::Text,
        requests_per_minute: 10,
        tokens_per_minute: 1_000_000,
        requests_per_day: 1_500,
    }
}

fn fast_backoff() {
    // Keep retry sleeps negligible in tests
    unsafe { std::env::set_var("GEMINI_BLOGGEN_RETRY_BASE_MS", "10") };
}

/// The orchestrator pays for the first attempt before calling generate()
fn acquire_first_slot(tracker: &QuotaTracker, quota: &ModelQuota, prompt: &str, max_tokens: u32) {
    let estimated = estimate_tokens(prompt, max_tokens);
    assert_eq!(
        tracker.try_acquire(quota, estimated).unwrap(),
        QuotaDecision::Allowed
    );
}

#[test]
#[serial]
fn test_transient_503_retried_and_quota_reacquired() {
    fast_backoff();
    let tracker = QuotaTracker::in_memory().unwrap();
    let quota = flash_quota();
    let prompt = "write an article";

    let (base_url, handle) = common::serve_responses(vec![
        common::http_response("503 Service Unavailable", "{\"error\":\"busy\"}"),
        common::generation_response("# Stub Article\n\nGenerated on the second try."),
    ]);
    let client =
        GenerationClient::with_base_url("test-key".to_string(), Duration::from_secs(5), base_url);

    acquire_first_slot(&tracker, &quota, prompt, 64);
    let result = client.generate(&tracker, &quota, prompt, 64).unwrap();

    assert!(result.success, "error: {:?}", result.error);
    assert_eq!(result.content, "# Stub Article\n\nGenerated on the second try.");
    assert_eq!(result.model_used, "gemini-2.0-flash");
    assert_eq!(handle.join().unwrap(), 2);

    // Exactly one retry happened, and it consumed its own quota slot
    let minute = tracker
        .usage("gemini-2.0-flash", Granularity::Minute)
        .unwrap()
        .unwrap();
    assert_eq!(minute.request_count, 2);
}

#[test]
#[serial]
fn test_permanent_400_fails_without_retry() {
    fast_backoff();
    let tracker = QuotaTracker::in_memory().unwrap();
    let quota = flash_quota();
    let prompt = "write an article";

    let (base_url, handle) = common::serve_responses(vec![common::http_response(
        "400 Bad Request",
        "{\"error\":\"invalid argument\"}",
    )]);
    let client =
        GenerationClient::with_base_url("test-key".to_string(), Duration::from_secs(5), base_url);

    acquire_first_slot(&tracker, &quota, prompt, 64);
    let result = client.generate(&tracker, &quota, prompt, 64).unwrap();

    assert!(!result.success);
    let err = result.error.unwrap();
    assert!(err.contains("400"), "got: {err}");
    assert_eq!(handle.join().unwrap(), 1);

    let minute = tracker
        .usage("gemini-2.0-flash", Granularity::Minute)
        .unwrap()
        .unwrap();
    assert_eq!(minute.request_count, 1);
}

#[test]
#[serial]
fn test_retries_exhausted_surfaces_failure() {
    fast_backoff();
    let tracker = QuotaTracker::in_memory().unwrap();
    let quota = flash_quota();
    let prompt = "write an article";

    let busy = common::http_response("503 Service Unavailable", "{\"error\":\"busy\"}");
    let (base_url, handle) =
        common::serve_responses(vec![busy.clone(), busy.clone(), busy]);
    let client =
        GenerationClient::with_base_url("test-key".to_string(), Duration::from_secs(5), base_url);

    acquire_first_slot(&tracker, &quota, prompt, 64);
    let result = client.generate(&tracker, &quota, prompt, 64).unwrap();

    assert!(!result.success);
    assert!(result.error.unwrap().contains("retries exhausted"));
    assert_eq!(handle.join().unwrap(), 3);

    let minute = tracker
        .usage("gemini-2.0-flash", Granularity::Minute)
        .unwrap()
        .unwrap();
    assert_eq!(minute.request_count, 3);
}

#[test]
#[serial]
fn test_retry_blocked_when_quota_is_gone() {
    fast_backoff();
    let tracker = QuotaTracker::in_memory().unwrap();
    // Only one request slot per minute: the retry cannot re-acquire
    let quota = ModelQuota {
        requests_per_minute: 1,
        ..flash_quota()
    };
    let prompt = "write an article";

    let (base_url, handle) = common::serve_responses(vec![common::http_response(
        "503 Service Unavailable",
        "{\"error\":\"busy\"}",
    )]);
    let client =
        GenerationClient::with_base_url("test-key".to_string(), Duration::from_secs(5), base_url);

    acquire_first_slot(&tracker, &quota, prompt, 64);
    let result = client.generate(&tracker, &quota, prompt, 64).unwrap();

    assert!(!result.success);
    assert!(result.error.unwrap().contains("retry blocked by quota"));
    // Only the first attempt reached the server
    assert_eq!(handle.join().unwrap(), 1);
}

#[test]
#[serial]
fn test_malformed_response_is_permanent() {
    fast_backoff();
    let tracker = QuotaTracker::in_memory().unwrap();
    let quota = flash_quota();
    let prompt = "write an article";

    let (base_url, handle) = common::serve_responses(vec![common::http_response(
        "200 OK",
        "this is not json",
    )]);
    let client =
        GenerationClient::with_base_url("test-key".to_string(), Duration::from_secs(5), base_url);

    acquire_first_slot(&tracker, &quota, prompt, 64);
    let result = client.generate(&tracker, &quota, prompt, 64).unwrap();

    assert!(!result.success);
    assert!(result.error.unwrap().contains("malformed"));
    assert_eq!(handle.join().unwrap(), 1);
}
